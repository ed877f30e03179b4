use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use vidstream_api::{ApiError, VideoApi};
use vidstream_contract::{
    ChunkUpload, ClientEvent, CompleteUploadRequest, EventSink, InitUploadRequest, Notifier,
    UploadSession, Video,
};

use crate::{
    plan::ChunkPlan,
    poll::{PollConfig, PollHandle, PollOutcome, ReadinessPoll},
    progress::{TransferStatus, UploadControls},
    source::UploadSource,
};

pub const NO_FILE_MESSAGE: &str = "Please select a file first";
pub const SUCCESS_MESSAGE: &str =
    "Upload completed successfully! Please restart the server to play the uploaded video.";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("failed to read upload source: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to initialize upload: {0}")]
    Init(#[source] ApiError),
    #[error("Failed to upload chunk {index}: {source}")]
    Chunk {
        index: u64,
        #[source]
        source: ApiError,
    },
    #[error("Failed to complete upload: {0}")]
    Complete(#[source] ApiError),
    #[error("Error checking video status: {0}")]
    Status(#[source] ApiError),
    #[error("Video processing failed")]
    ProcessingFailed,
    #[error("Video processing timeout after {attempts} attempts")]
    ProcessingTimeout { attempts: u32 },
    #[error("readiness poll cancelled")]
    PollCancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    pub upload_id: String,
    pub chunk_count: u64,
    pub completion: Value,
    pub video: Video,
}

/// Sequential chunked uploader. `&mut self` keeps at most one upload in
/// flight per instance.
pub struct VideoUploader {
    api: Arc<dyn VideoApi>,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventSink>,
    controls: UploadControls,
    poll_config: PollConfig,
    next_poll: PollHandle,
    alert_on_success: bool,
}

impl VideoUploader {
    pub fn new(
        api: Arc<dyn VideoApi>,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            api,
            notifier,
            events,
            controls: UploadControls::default(),
            poll_config: PollConfig::default(),
            next_poll: PollHandle::new(),
            alert_on_success: true,
        }
    }

    /// Leaves the success alert to the caller, which raises it once the
    /// catalog refresh has run.
    pub fn defer_success_alert(mut self) -> Self {
        self.alert_on_success = false;
        self
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    pub fn controls(&self) -> &UploadControls {
        &self.controls
    }

    /// Handle that cancels the readiness poll of the next upload. Clones can
    /// be moved to another task and fired while that poll waits.
    pub fn poll_handle(&self) -> PollHandle {
        self.next_poll.clone()
    }

    /// Runs the whole upload and reports the outcome to the user. Errors are
    /// also returned so callers can react programmatically.
    pub async fn start_upload(
        &mut self,
        source: Option<UploadSource>,
    ) -> Result<UploadReport, UploadError> {
        let Some(source) = source else {
            self.notifier.alert(NO_FILE_MESSAGE);
            return Err(UploadError::NoFileSelected);
        };

        let poll = std::mem::take(&mut self.next_poll);
        let result = self.upload(&source, &poll).await;

        match result {
            Ok(report) => {
                self.controls.set_status(TransferStatus::Success);
                self.events.publish(ClientEvent::UploadCompleted {
                    video_id: report.video.id.clone(),
                });
                if self.events.publish(ClientEvent::CatalogRefreshRequested) == 0 {
                    error!("video list not initialized; catalog refresh dropped");
                }
                if self.alert_on_success {
                    self.notifier.alert(SUCCESS_MESSAGE);
                }
                Ok(report)
            }
            Err(err) => {
                error!(file = %source.file_name(), error = %err, "upload failed");
                self.controls.reset();
                self.controls.set_status(TransferStatus::Failed);
                self.notifier.alert(&format!("Upload failed: {err}"));
                Err(err)
            }
        }
    }

    async fn upload(
        &mut self,
        source: &UploadSource,
        poll: &PollHandle,
    ) -> Result<UploadReport, UploadError> {
        let session: UploadSession = self
            .api
            .init_upload(&InitUploadRequest {
                file_name: source.file_name().to_string(),
                file_size: source.size(),
                content_type: source.content_type().to_string(),
            })
            .await
            .map_err(UploadError::Init)?
            .into();

        let plan = ChunkPlan::new(source.size(), session.chunk_size);
        info!(
            upload_id = %session.upload_id,
            file = %source.file_name(),
            size = source.size(),
            chunk_size = plan.chunk_size(),
            chunks = plan.chunk_count(),
            "upload session opened"
        );
        self.controls.set_status(TransferStatus::Uploading);

        for (index, range) in plan.ranges() {
            let bytes = source.read_range(range).await?;
            self.api
                .upload_chunk(ChunkUpload {
                    upload_id: session.upload_id.clone(),
                    chunk_index: index,
                    bytes,
                })
                .await
                .map_err(|source| UploadError::Chunk { index, source })?;

            let percent = plan.progress_percent(index + 1);
            self.controls.update_progress(percent);
            self.events.publish(ClientEvent::UploadProgress {
                upload_id: session.upload_id.clone(),
                percent,
            });
        }
        if plan.chunk_count() == 0 {
            let percent = plan.progress_percent(0);
            self.controls.update_progress(percent);
            self.events.publish(ClientEvent::UploadProgress {
                upload_id: session.upload_id.clone(),
                percent,
            });
        }

        let completion = self
            .api
            .complete_upload(&CompleteUploadRequest {
                upload_id: session.upload_id.clone(),
            })
            .await
            .map_err(UploadError::Complete)?;
        info!(upload_id = %session.upload_id, result = %completion, "upload completed");

        self.controls.set_status(TransferStatus::Processing);
        let outcome = ReadinessPoll::with_handle(
            self.api.clone(),
            session.upload_id.clone(),
            self.poll_config,
            poll,
        )
        .run()
        .await
        .map_err(UploadError::Status)?;

        match outcome {
            PollOutcome::Ready(video) => Ok(UploadReport {
                upload_id: session.upload_id,
                chunk_count: plan.chunk_count(),
                completion,
                video,
            }),
            PollOutcome::Failed(_) => Err(UploadError::ProcessingFailed),
            PollOutcome::TimedOut { attempts } => {
                Err(UploadError::ProcessingTimeout { attempts })
            }
            PollOutcome::Cancelled => {
                warn!(upload_id = %session.upload_id, "readiness poll cancelled");
                Err(UploadError::PollCancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use vidstream_api::{ApiCall, InMemoryVideoApi};
    use vidstream_contract::{endpoints, ClientEvent, EventSink, Notifier, VideoStatus};

    use super::{UploadError, VideoUploader, NO_FILE_MESSAGE, SUCCESS_MESSAGE};
    use crate::{poll::MAX_POLL_ATTEMPTS, progress::TransferStatus, source::UploadSource};

    #[derive(Default)]
    struct Recorder {
        alerts: Mutex<Vec<String>>,
        events: Mutex<Vec<ClientEvent>>,
        subscribers: usize,
    }

    impl Recorder {
        fn listening() -> Arc<Self> {
            Arc::new(Self {
                subscribers: 1,
                ..Self::default()
            })
        }

        fn alerts(&self) -> Vec<String> {
            self.alerts.lock().unwrap().clone()
        }

        fn events(&self) -> Vec<ClientEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Notifier for Recorder {
        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }
    }

    impl EventSink for Recorder {
        fn publish(&self, event: ClientEvent) -> usize {
            self.events.lock().unwrap().push(event);
            self.subscribers
        }
    }

    fn uploader(api: Arc<InMemoryVideoApi>, recorder: Arc<Recorder>) -> VideoUploader {
        VideoUploader::new(api, recorder.clone(), recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn uploads_every_chunk_in_order_then_completes() {
        let api = Arc::new(
            InMemoryVideoApi::new()
                .with_chunk_size(4)
                .with_status_script_for_next_upload(vec![
                    VideoStatus::Processing,
                    VideoStatus::Ready,
                ]),
        );
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let source = UploadSource::from_bytes("clip.mp4", vec![7u8; 10]);
        let report = uploader.start_upload(Some(source)).await.expect("upload");

        assert_eq!(report.chunk_count, 3);
        assert_eq!(report.video.status, VideoStatus::Ready);
        assert_eq!(api.chunk_indices().await, vec![0, 1, 2]);
        assert_eq!(api.info_calls(&report.upload_id).await, 2);

        let calls = api.calls().await;
        assert!(matches!(&calls[0], ApiCall::InitUpload(init)
            if init.file_name == "clip.mp4" && init.file_size == 10 && init.content_type == "video/mp4"));
        let complete_pos = calls
            .iter()
            .position(|call| matches!(call, ApiCall::CompleteUpload(id) if *id == report.upload_id))
            .expect("complete called");
        let last_chunk_pos = calls
            .iter()
            .rposition(|call| matches!(call, ApiCall::UploadChunk { .. }))
            .expect("chunks sent");
        assert!(last_chunk_pos < complete_pos);

        let sizes: Vec<usize> = calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::UploadChunk { len, .. } => Some(*len),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_upload_requests_catalog_refresh() {
        let api = Arc::new(
            InMemoryVideoApi::new()
                .with_chunk_size(3)
                .with_status_script_for_next_upload(vec![VideoStatus::Ready]),
        );
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let source = UploadSource::from_bytes("clip.mp4", vec![1u8; 7]);
        uploader.start_upload(Some(source)).await.expect("upload");

        assert_eq!(recorder.alerts(), vec![SUCCESS_MESSAGE.to_string()]);
        assert!(recorder
            .events()
            .contains(&ClientEvent::CatalogRefreshRequested));
        assert_eq!(uploader.controls().status, TransferStatus::Success);
        assert!(uploader.controls().trigger_enabled);

        let progress: Vec<f64> = recorder
            .events()
            .iter()
            .filter_map(|event| match event {
                ClientEvent::UploadProgress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(progress.len(), 3);
        assert_eq!(progress.last().copied(), Some(100.0));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_times_out_after_attempt_budget() {
        // Without a script the service leaves the video pending forever.
        let api = Arc::new(InMemoryVideoApi::new());
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let err = uploader
            .start_upload(Some(UploadSource::from_bytes("clip.mp4", vec![1u8; 4])))
            .await
            .expect_err("times out");

        assert!(matches!(
            err,
            UploadError::ProcessingTimeout { attempts } if attempts == MAX_POLL_ATTEMPTS
        ));
        assert!(recorder.alerts()[0].contains("Video processing timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_chunk_stops_upload_before_completion() {
        let api = Arc::new(
            InMemoryVideoApi::new()
                .with_chunk_size(2)
                .with_failing_chunk(1),
        );
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let source = UploadSource::from_bytes("clip.mp4", vec![0u8; 8]);
        let err = uploader
            .start_upload(Some(source))
            .await
            .expect_err("chunk 1 fails");

        assert!(matches!(err, UploadError::Chunk { index: 1, .. }));
        assert_eq!(api.chunk_indices().await, vec![0, 1]);
        assert!(!api
            .calls()
            .await
            .iter()
            .any(|call| matches!(call, ApiCall::CompleteUpload(_))));
        assert!(recorder.alerts()[0].starts_with("Upload failed: Failed to upload chunk 1"));
        assert!(uploader.controls().trigger_enabled);
        assert_eq!(uploader.controls().status, TransferStatus::Failed);
    }

    #[tokio::test]
    async fn missing_file_is_reported_without_network() {
        let api = Arc::new(InMemoryVideoApi::new());
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let err = uploader.start_upload(None).await.expect_err("no file");
        assert!(matches!(err, UploadError::NoFileSelected));
        assert_eq!(recorder.alerts(), vec![NO_FILE_MESSAGE.to_string()]);
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn init_failure_aborts() {
        let api = Arc::new(InMemoryVideoApi::new().with_failing_endpoint(endpoints::UPLOAD_INIT));
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let err = uploader
            .start_upload(Some(UploadSource::from_bytes("clip.mp4", vec![1, 2, 3])))
            .await
            .expect_err("init fails");
        assert!(matches!(err, UploadError::Init(_)));
        assert_eq!(api.calls().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn processing_error_fails_without_exhausting_attempts() {
        let api = Arc::new(
            InMemoryVideoApi::new()
                .with_status_script_for_next_upload(vec![VideoStatus::Processing, VideoStatus::Error]),
        );
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let err = uploader
            .start_upload(Some(UploadSource::from_bytes("clip.mp4", vec![1u8; 16])))
            .await
            .expect_err("processing fails");

        assert!(matches!(err, UploadError::ProcessingFailed));
        let polls = api
            .calls()
            .await
            .iter()
            .filter(|call| matches!(call, ApiCall::VideoInfo(_)))
            .count();
        assert_eq!(polls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_poll_fails_the_upload() {
        let api = Arc::new(InMemoryVideoApi::new());
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        uploader.poll_handle().cancel();
        let err = uploader
            .start_upload(Some(UploadSource::from_bytes("clip.mp4", vec![1u8; 4])))
            .await
            .expect_err("cancelled");

        assert!(matches!(err, UploadError::PollCancelled));
        assert!(!uploader.poll_handle().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_without_listener_still_succeeds() {
        let api = Arc::new(
            InMemoryVideoApi::new().with_status_script_for_next_upload(vec![VideoStatus::Ready]),
        );
        let recorder = Arc::new(Recorder::default());
        let mut uploader = uploader(api, recorder.clone());

        uploader
            .start_upload(Some(UploadSource::from_bytes("clip.mp4", vec![1u8; 4])))
            .await
            .expect("upload");
        assert_eq!(recorder.alerts(), vec![SUCCESS_MESSAGE.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_file_skips_to_completion_at_full_progress() {
        let api = Arc::new(
            InMemoryVideoApi::new().with_status_script_for_next_upload(vec![VideoStatus::Ready]),
        );
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let report = uploader
            .start_upload(Some(UploadSource::from_bytes("empty.mp4", Vec::new())))
            .await
            .expect("upload");

        assert_eq!(report.chunk_count, 0);
        assert!(api.chunk_indices().await.is_empty());
        assert!(api
            .calls()
            .await
            .iter()
            .any(|call| matches!(call, ApiCall::CompleteUpload(id) if *id == report.upload_id)));
        assert_eq!(uploader.controls().progress, 100.0);
        assert!(uploader.controls().trigger_enabled);
        assert!(recorder.events().contains(&ClientEvent::UploadProgress {
            upload_id: report.upload_id.clone(),
            percent: 100.0,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_while_poll_waits_stops_further_polling() {
        let api = Arc::new(InMemoryVideoApi::new());
        let recorder = Recorder::listening();
        let mut uploader = uploader(api.clone(), recorder.clone());

        let handle = uploader.poll_handle();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            handle.cancel();
        });

        let err = uploader
            .start_upload(Some(UploadSource::from_bytes("clip.mp4", vec![1u8; 4])))
            .await
            .expect_err("cancelled");
        canceller.await.expect("canceller task");

        assert!(matches!(err, UploadError::PollCancelled));
        let calls = api.calls().await;
        assert!(calls
            .iter()
            .any(|call| matches!(call, ApiCall::CompleteUpload(_))));
        // Attempts at 0s, 2s and 4s; the cancel lands during the wait for 6s.
        let polls = calls
            .iter()
            .filter(|call| matches!(call, ApiCall::VideoInfo(_)))
            .count();
        assert_eq!(polls, 3);
        assert_eq!(uploader.controls().status, TransferStatus::Failed);
        assert!(recorder.alerts()[0].starts_with("Upload failed: readiness poll cancelled"));
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_success_alert_is_left_to_caller() {
        let api = Arc::new(
            InMemoryVideoApi::new().with_status_script_for_next_upload(vec![VideoStatus::Ready]),
        );
        let recorder = Recorder::listening();
        let mut uploader = uploader(api, recorder.clone()).defer_success_alert();

        uploader
            .start_upload(Some(UploadSource::from_bytes("clip.mp4", vec![1u8; 4])))
            .await
            .expect("upload");
        assert!(recorder.alerts().is_empty());
        assert!(recorder
            .events()
            .contains(&ClientEvent::CatalogRefreshRequested));
    }
}
