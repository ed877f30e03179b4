use serde::{Deserialize, Serialize};

use crate::video::VideoId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    UploadProgress { upload_id: String, percent: f64 },
    UploadCompleted { video_id: VideoId },
    CatalogRefreshRequested,
    CatalogLoaded { count: usize },
    PlaybackRegionFocused { video_id: VideoId },
}

impl ClientEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UploadProgress { .. } => "upload.progress",
            Self::UploadCompleted { .. } => "upload.completed",
            Self::CatalogRefreshRequested => "catalog.refresh_requested",
            Self::CatalogLoaded { .. } => "catalog.loaded",
            Self::PlaybackRegionFocused { .. } => "player.region_focused",
        }
    }
}

/// Outbound side of the client event bus.
pub trait EventSink: Send + Sync {
    /// Returns how many subscribers received the event.
    fn publish(&self, event: ClientEvent) -> usize;
}

/// User-facing blocking message, the headless stand-in for `alert()`.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}
