use async_trait::async_trait;
use reqwest::{multipart, Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use vidstream_contract::{
    endpoints, ChunkAck, ChunkUpload, CompleteUploadRequest, InitUploadRequest,
    InitUploadResponse, StreamSource, Video,
};

use crate::api::{ApiError, VideoApi};

const USER_AGENT: &str = concat!("vidstream/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed client for the video service. No per-request timeout is
/// configured.
#[derive(Debug, Clone)]
pub struct HttpVideoApi {
    client: Client,
    base: Url,
}

impl HttpVideoApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|_| ApiError::InvalidBaseUrl(format!("{}{}", self.base, path)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path)?)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        decode(path, ensure_ok(path, response)?).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path)?)
            .json(body)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        decode(path, ensure_ok(path, response)?).await
    }
}

#[async_trait]
impl VideoApi for HttpVideoApi {
    async fn list_videos(&self) -> Result<Vec<Video>, ApiError> {
        let videos: Option<Vec<Video>> = self.get_json(endpoints::VIDEOS).await?;
        let videos = videos.unwrap_or_default();
        info!(count = videos.len(), "catalog fetched");
        Ok(videos)
    }

    async fn video_info(&self, video_id: &str) -> Result<Video, ApiError> {
        let video: Video = self.get_json(&endpoints::video_info(video_id)).await?;
        debug!(video_id = %video.id, status = %video.status, "video info fetched");
        Ok(video)
    }

    async fn probe_stream(&self, source: &StreamSource) -> Result<(), ApiError> {
        let path = source.path();
        let response = self
            .client
            .head(self.url(&path)?)
            .send()
            .await
            .map_err(|source| transport(&path, source))?;
        ensure_ok(&path, response).map(|_| ())
    }

    fn source_url(&self, source: &StreamSource) -> String {
        let path = source.path();
        match self.base.join(&path) {
            Ok(url) => url.to_string(),
            Err(_) => path,
        }
    }

    async fn init_upload(
        &self,
        request: &InitUploadRequest,
    ) -> Result<InitUploadResponse, ApiError> {
        self.post_json(endpoints::UPLOAD_INIT, request).await
    }

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<ChunkAck, ApiError> {
        let path = endpoints::UPLOAD_CHUNK;
        let chunk_index = chunk.chunk_index;
        // The server reads `chunk` as a form file, so it needs a filename.
        let part = multipart::Part::bytes(chunk.bytes).file_name("blob");
        let form = multipart::Form::new()
            .part("chunk", part)
            .text("uploadId", chunk.upload_id)
            .text("chunkIndex", chunk_index.to_string());

        let response = self
            .client
            .post(self.url(path)?)
            .multipart(form)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        let body = ensure_ok(path, response)?
            .bytes()
            .await
            .map_err(|source| transport(path, source))?;
        match serde_json::from_slice(&body) {
            Ok(ack) => Ok(ack),
            Err(err) => {
                debug!(chunk_index, error = %err, "chunk acknowledged without a JSON body");
                Ok(ChunkAck::default())
            }
        }
    }

    async fn complete_upload(&self, request: &CompleteUploadRequest) -> Result<Value, ApiError> {
        self.post_json(endpoints::UPLOAD_COMPLETE, request).await
    }
}

fn transport(endpoint: &str, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}

fn ensure_ok(endpoint: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
        })
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| transport(endpoint, source))?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode {
        endpoint: endpoint.to_string(),
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::HttpVideoApi;
    use crate::api::{ApiError, VideoApi};
    use vidstream_contract::StreamSource;

    #[test]
    fn source_url_is_absolute_against_base() {
        let api = HttpVideoApi::new("http://127.0.0.1:8080").expect("client");
        let source = StreamSource::new("v1", "720p").cache_busted(42);
        assert_eq!(
            api.source_url(&source),
            "http://127.0.0.1:8080/api/videos/v1/stream?quality=720p&t=42"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            HttpVideoApi::new("not a url"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }
}
