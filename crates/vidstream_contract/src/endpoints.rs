pub const VIDEOS: &str = "/api/videos";
pub const UPLOAD_INIT: &str = "/api/upload/init";
pub const UPLOAD_CHUNK: &str = "/api/upload/chunk";
pub const UPLOAD_COMPLETE: &str = "/api/upload/complete";

pub fn video_info(video_id: &str) -> String {
    format!("{VIDEOS}/{video_id}/info")
}

/// A playable source: one quality of one video, optionally cache-busted
/// with a millisecond timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub video_id: String,
    pub quality: String,
    pub timestamp_ms: Option<i64>,
}

impl StreamSource {
    pub fn new(video_id: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            quality: quality.into(),
            timestamp_ms: None,
        }
    }

    pub fn cache_busted(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub fn path(&self) -> String {
        let mut path = format!(
            "{VIDEOS}/{}/stream?quality={}",
            self.video_id, self.quality
        );
        if let Some(ts) = self.timestamp_ms {
            path.push_str(&format!("&t={ts}"));
        }
        path
    }
}
