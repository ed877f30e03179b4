use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use thiserror::Error;
use vidstream_contract::{
    ChunkAck, ChunkUpload, CompleteUploadRequest, InitUploadRequest, InitUploadResponse,
    StreamSource, Video,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error! status: {status} ({endpoint})")]
    Status { endpoint: String, status: StatusCode },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid response body from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },
    #[error("invalid base URL {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Every server interaction the client makes. Each call is one request;
/// nothing is cached between calls.
#[async_trait]
pub trait VideoApi: Send + Sync {
    async fn list_videos(&self) -> Result<Vec<Video>, ApiError>;

    async fn video_info(&self, video_id: &str) -> Result<Video, ApiError>;

    /// HEAD reachability check of a stream source.
    async fn probe_stream(&self, source: &StreamSource) -> Result<(), ApiError>;

    /// Absolute URL a media element can be pointed at.
    fn source_url(&self, source: &StreamSource) -> String;

    async fn init_upload(
        &self,
        request: &InitUploadRequest,
    ) -> Result<InitUploadResponse, ApiError>;

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<ChunkAck, ApiError>;

    async fn complete_upload(&self, request: &CompleteUploadRequest) -> Result<Value, ApiError>;
}
