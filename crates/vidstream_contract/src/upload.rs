use serde::{Deserialize, Serialize};

/// Chunk size requested when the server does not negotiate one.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitUploadRequest {
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitUploadResponse {
    pub upload_id: String,
    #[serde(default)]
    pub chunk_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    pub upload_id: String,
}

/// Optional body of a chunk response. Only the status decides success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub chunk_index: Option<serde_json::Value>,
}

/// One multipart chunk request. Not serde: it travels as form fields
/// `chunk`, `uploadId` and `chunkIndex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkUpload {
    pub upload_id: String,
    pub chunk_index: u64,
    pub bytes: Vec<u8>,
}

/// Server-assigned session for a single upload call. The upload id doubles
/// as the id of the video the server creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub upload_id: String,
    pub chunk_size: u64,
}

impl From<InitUploadResponse> for UploadSession {
    fn from(response: InitUploadResponse) -> Self {
        let chunk_size = if response.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            response.chunk_size
        };
        Self {
            upload_id: response.upload_id,
            chunk_size,
        }
    }
}
