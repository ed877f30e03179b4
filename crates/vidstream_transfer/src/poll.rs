use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tracing::{debug, info};
use vidstream_api::{ApiError, VideoApi};
use vidstream_contract::{Video, VideoStatus};

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const MAX_POLL_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Ready(Video),
    Failed(Video),
    TimedOut { attempts: u32 },
    Cancelled,
}

/// Cancels the readiness poll it was paired with. Clones share the flag.
#[derive(Debug, Clone)]
pub struct PollHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl Default for PollHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl PollHandle {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel: Arc::new(cancel),
        }
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.cancel.subscribe()
    }
}

/// Repeated info requests until the server reports a terminal status, the
/// attempt budget runs out, or the paired [`PollHandle`] cancels.
pub struct ReadinessPoll {
    api: Arc<dyn VideoApi>,
    video_id: String,
    config: PollConfig,
    cancel: watch::Receiver<bool>,
}

impl ReadinessPoll {
    pub fn new(
        api: Arc<dyn VideoApi>,
        video_id: impl Into<String>,
        config: PollConfig,
    ) -> (Self, PollHandle) {
        let handle = PollHandle::new();
        let poll = Self::with_handle(api, video_id, config, &handle);
        (poll, handle)
    }

    pub fn with_handle(
        api: Arc<dyn VideoApi>,
        video_id: impl Into<String>,
        config: PollConfig,
        handle: &PollHandle,
    ) -> Self {
        Self {
            api,
            video_id: video_id.into(),
            config,
            cancel: handle.subscribe(),
        }
    }

    /// A non-OK info response ends the poll with the error.
    pub async fn run(mut self) -> Result<PollOutcome, ApiError> {
        info!(video_id = %self.video_id, "waiting for video to be ready");

        for attempt in 1..=self.config.max_attempts {
            if *self.cancel.borrow() {
                return Ok(PollOutcome::Cancelled);
            }

            let video = self.api.video_info(&self.video_id).await?;
            debug!(video_id = %self.video_id, attempt, status = %video.status, "video status");
            match video.status {
                VideoStatus::Ready => {
                    info!(video_id = %self.video_id, attempt, "video is ready");
                    return Ok(PollOutcome::Ready(video));
                }
                VideoStatus::Error => return Ok(PollOutcome::Failed(video)),
                _ => {}
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = cancelled(&mut self.cancel) => return Ok(PollOutcome::Cancelled),
            }
        }

        Ok(PollOutcome::TimedOut {
            attempts: self.config.max_attempts,
        })
    }
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Every handle is gone; nothing can cancel any more.
            std::future::pending::<()>().await;
        }
    }
}
