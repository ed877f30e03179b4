use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use http::StatusCode;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;
use vidstream_contract::{
    endpoints, ChunkAck, ChunkUpload, CompleteUploadRequest, InitUploadRequest,
    InitUploadResponse, StreamSource, Video, VideoStatus, DEFAULT_CHUNK_SIZE,
};

use crate::api::{ApiError, VideoApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListVideos,
    VideoInfo(String),
    ProbeStream(StreamSource),
    InitUpload(InitUploadRequest),
    UploadChunk {
        upload_id: String,
        chunk_index: u64,
        len: usize,
    },
    CompleteUpload(String),
}

#[derive(Debug, Default)]
struct InMemoryState {
    videos: Vec<Video>,
    status_scripts: HashMap<String, VecDeque<VideoStatus>>,
    next_upload_script: Option<Vec<VideoStatus>>,
    unreachable: HashSet<String>,
    failing_endpoints: HashSet<&'static str>,
    failing_chunk: Option<u64>,
    chunk_size: Option<u64>,
    uploads: HashMap<String, InitUploadRequest>,
    calls: Vec<ApiCall>,
}

/// Scripted, in-process stand-in for the video service. Records every call
/// so callers can assert on ordering.
#[derive(Debug, Default)]
pub struct InMemoryVideoApi {
    state: Mutex<InMemoryState>,
}

impl InMemoryVideoApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, video: Video) -> Self {
        self.state.get_mut().videos.push(video);
        self
    }

    /// Statuses handed out by successive info calls for `video_id`; the last
    /// one repeats once the script runs out.
    pub fn with_status_script(mut self, video_id: &str, statuses: Vec<VideoStatus>) -> Self {
        self.state
            .get_mut()
            .status_scripts
            .insert(video_id.to_string(), statuses.into());
        self
    }

    /// Status script attached to whichever upload id the next init hands out.
    pub fn with_status_script_for_next_upload(mut self, statuses: Vec<VideoStatus>) -> Self {
        self.state.get_mut().next_upload_script = Some(statuses);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.state.get_mut().chunk_size = Some(chunk_size);
        self
    }

    pub fn with_unreachable_stream(mut self, video_id: &str) -> Self {
        self.state.get_mut().unreachable.insert(video_id.to_string());
        self
    }

    pub fn with_failing_chunk(mut self, chunk_index: u64) -> Self {
        self.state.get_mut().failing_chunk = Some(chunk_index);
        self
    }

    /// Makes every call to `endpoint` (one of `endpoints::*`) answer 500.
    pub fn with_failing_endpoint(mut self, endpoint: &'static str) -> Self {
        self.state.get_mut().failing_endpoints.insert(endpoint);
        self
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn chunk_indices(&self) -> Vec<u64> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::UploadChunk { chunk_index, .. } => Some(chunk_index),
                _ => None,
            })
            .collect()
    }

    pub async fn info_calls(&self, video_id: &str) -> usize {
        self.calls()
            .await
            .iter()
            .filter(|call| matches!(call, ApiCall::VideoInfo(id) if id == video_id))
            .count()
    }
}

fn server_error(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn not_found(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: StatusCode::NOT_FOUND,
    }
}

#[async_trait]
impl VideoApi for InMemoryVideoApi {
    async fn list_videos(&self) -> Result<Vec<Video>, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::ListVideos);
        if state.failing_endpoints.contains(endpoints::VIDEOS) {
            return Err(server_error(endpoints::VIDEOS));
        }
        Ok(state.videos.clone())
    }

    async fn video_info(&self, video_id: &str) -> Result<Video, ApiError> {
        let path = endpoints::video_info(video_id);
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::VideoInfo(video_id.to_string()));

        let scripted = state.status_scripts.get_mut(video_id).and_then(|script| {
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        });

        let video = state.videos.iter_mut().find(|video| video.id == video_id);
        match (video, scripted) {
            (Some(video), Some(status)) => {
                video.status = status;
                Ok(video.clone())
            }
            (Some(video), None) => Ok(video.clone()),
            (None, Some(status)) => Ok(Video::new(video_id, format!("{video_id}.mp4"), status)),
            (None, None) => Err(not_found(&path)),
        }
    }

    async fn probe_stream(&self, source: &StreamSource) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::ProbeStream(source.clone()));

        let known = state.videos.iter().any(|video| {
            video.id == source.video_id
                && video
                    .qualities
                    .iter()
                    .any(|quality| quality.resolution == source.quality)
        });
        if state.unreachable.contains(&source.video_id) || !known {
            return Err(not_found(&source.path()));
        }
        Ok(())
    }

    fn source_url(&self, source: &StreamSource) -> String {
        source.path()
    }

    async fn init_upload(
        &self,
        request: &InitUploadRequest,
    ) -> Result<InitUploadResponse, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::InitUpload(request.clone()));
        if state.failing_endpoints.contains(endpoints::UPLOAD_INIT) {
            return Err(server_error(endpoints::UPLOAD_INIT));
        }

        let upload_id = Uuid::now_v7().to_string();
        state.uploads.insert(upload_id.clone(), request.clone());
        if let Some(script) = state.next_upload_script.take() {
            state.status_scripts.insert(upload_id.clone(), script.into());
        }
        Ok(InitUploadResponse {
            upload_id,
            chunk_size: state.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
        })
    }

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<ChunkAck, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::UploadChunk {
            upload_id: chunk.upload_id.clone(),
            chunk_index: chunk.chunk_index,
            len: chunk.bytes.len(),
        });

        if state.failing_chunk == Some(chunk.chunk_index)
            || state.failing_endpoints.contains(endpoints::UPLOAD_CHUNK)
        {
            return Err(server_error(endpoints::UPLOAD_CHUNK));
        }
        if !state.uploads.contains_key(&chunk.upload_id) {
            return Err(not_found(endpoints::UPLOAD_CHUNK));
        }

        Ok(ChunkAck {
            message: Some("Chunk uploaded successfully".to_string()),
            chunk_index: Some(json!(chunk.chunk_index.to_string())),
        })
    }

    async fn complete_upload(&self, request: &CompleteUploadRequest) -> Result<Value, ApiError> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(ApiCall::CompleteUpload(request.upload_id.clone()));
        if state.failing_endpoints.contains(endpoints::UPLOAD_COMPLETE) {
            return Err(server_error(endpoints::UPLOAD_COMPLETE));
        }

        let Some(init) = state.uploads.get(&request.upload_id).cloned() else {
            return Err(not_found(endpoints::UPLOAD_COMPLETE));
        };

        if !state.videos.iter().any(|video| video.id == request.upload_id) {
            let mut video = Video::new(
                request.upload_id.clone(),
                init.file_name.clone(),
                VideoStatus::Pending,
            )
            .with_created_at(Utc::now());
            video.file_name = Some(init.file_name);
            video.file_size = Some(init.file_size);
            video.content_type = Some(init.content_type);
            state.videos.push(video);
        }

        info!(upload_id = %request.upload_id, "in-memory upload completed");
        Ok(json!({ "message": "Upload completed, transcoding started" }))
    }
}
