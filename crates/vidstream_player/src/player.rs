use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use vidstream_api::{ApiError, VideoApi};
use vidstream_contract::{Notifier, Quality, StreamSource, VideoStatus};

use crate::{
    error::{PlaybackError, RetryPolicy},
    media::MediaElement,
    quality::{select_default_quality, QualityControls},
};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Video is not ready (status: {0})")]
    NotReady(VideoStatus),
    #[error("No video qualities available")]
    NoQualities,
    #[error("Video file not accessible: {0}")]
    Unreachable(#[source] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorOutcome {
    Retried,
    RetryExhausted(PlaybackError),
    Ignored(PlaybackError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NowPlaying {
    video_id: String,
    quality: String,
}

pub struct VideoPlayer<M> {
    api: Arc<dyn VideoApi>,
    notifier: Arc<dyn Notifier>,
    media: M,
    retry_policy: RetryPolicy,
    now_playing: Option<NowPlaying>,
    controls: Option<QualityControls>,
    retries_used: u32,
    last_timestamp: i64,
}

impl<M: MediaElement> VideoPlayer<M> {
    pub fn new(api: Arc<dyn VideoApi>, notifier: Arc<dyn Notifier>, media: M) -> Self {
        Self {
            api,
            notifier,
            media,
            retry_policy: RetryPolicy::default(),
            now_playing: None,
            controls: None,
            retries_used: 0,
            last_timestamp: 0,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn controls(&self) -> Option<&QualityControls> {
        self.controls.as_ref()
    }

    pub fn current_video_id(&self) -> Option<&str> {
        self.now_playing.as_ref().map(|now| now.video_id.as_str())
    }

    pub fn current_quality(&self) -> Option<&str> {
        self.now_playing.as_ref().map(|now| now.quality.as_str())
    }

    /// Loads the default quality of `video_id`. Failures are alerted to the
    /// user and returned.
    pub async fn load_video(&mut self, video_id: &str) -> Result<(), PlayerError> {
        info!(video_id = %video_id, "loading video");
        match self.try_load(video_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(video_id = %video_id, error = %err, "failed to load video");
                self.notifier.alert(&format!("Failed to load video: {err}"));
                Err(err)
            }
        }
    }

    async fn try_load(&mut self, video_id: &str) -> Result<(), PlayerError> {
        let video = self.api.video_info(video_id).await?;
        if !video.status.is_ready() {
            return Err(PlayerError::NotReady(video.status));
        }

        let quality = select_default_quality(&video.qualities)
            .cloned()
            .ok_or(PlayerError::NoQualities)?;

        let source = StreamSource::new(video_id, quality.resolution.clone())
            .cache_busted(self.next_timestamp());
        self.api
            .probe_stream(&source)
            .await
            .map_err(PlayerError::Unreachable)?;

        let url = self.api.source_url(&source);
        info!(video_id = %video_id, quality = %quality.resolution, url = %url, "setting video source");
        self.media.set_source(&url);
        self.media.load();

        self.now_playing = Some(NowPlaying {
            video_id: video_id.to_string(),
            quality: quality.resolution.clone(),
        });
        self.retries_used = 0;
        self.controls = Some(QualityControls::new(video.qualities, quality.resolution));
        Ok(())
    }

    /// Reaction to the media element's error event.
    pub fn handle_media_error(&mut self, code: u16) -> MediaErrorOutcome {
        let error = PlaybackError::from_code(code);
        warn!(code, error = ?error, "media element error");

        if !self.retry_policy.is_retryable(error) {
            return MediaErrorOutcome::Ignored(error);
        }
        if !self.retry_policy.should_retry(error, self.retries_used) {
            warn!(retries = self.retries_used, "reload already attempted for this source");
            return MediaErrorOutcome::RetryExhausted(error);
        }
        let Some(now) = self.now_playing.clone() else {
            return MediaErrorOutcome::Ignored(error);
        };

        self.retries_used += 1;
        let source = StreamSource::new(now.video_id, now.quality).cache_busted(self.next_timestamp());
        let url = self.api.source_url(&source);
        info!(url = %url, "retrying with new source");
        self.media.set_source(&url);
        self.media.load();
        MediaErrorOutcome::Retried
    }

    /// Reaction to the media element's `canplay` event.
    pub fn on_can_play(&mut self) {
        if let Err(err) = self.media.play() {
            warn!(error = %err, "play failed");
        }
    }

    /// Switches to `quality`, keeping the playback position. Returns false
    /// when nothing is loaded.
    pub fn change_quality(&mut self, quality: &Quality) -> bool {
        let Some(now) = self.now_playing.as_mut() else {
            warn!(quality = %quality.resolution, "quality change without a loaded video");
            return false;
        };

        let position = self.media.current_time();
        now.quality = quality.resolution.clone();
        let source = StreamSource::new(now.video_id.clone(), quality.resolution.clone());
        let url = self.api.source_url(&source);

        self.media.set_source(&url);
        self.media.set_current_time(position);
        if let Err(err) = self.media.play() {
            warn!(error = %err, "play failed after quality change");
        }

        self.retries_used = 0;
        if let Some(controls) = self.controls.as_mut() {
            controls.active = quality.resolution.clone();
        }
        true
    }

    pub fn change_quality_to(&mut self, resolution: &str) -> bool {
        let quality = self
            .controls
            .as_ref()
            .and_then(|controls| controls.find(resolution))
            .cloned();
        match quality {
            Some(quality) => self.change_quality(&quality),
            None => {
                warn!(quality = %resolution, "quality not offered for this video");
                false
            }
        }
    }

    // Strictly increasing so back-to-back reloads never reuse a URL.
    fn next_timestamp(&mut self) -> i64 {
        let ts = Utc::now().timestamp_millis().max(self.last_timestamp + 1);
        self.last_timestamp = ts;
        ts
    }
}
