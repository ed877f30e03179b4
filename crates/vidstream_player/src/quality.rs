use serde::{Deserialize, Serialize};
use vidstream_contract::Quality;

pub const PREFERRED_QUALITY: &str = "720p";

/// 720p when offered, otherwise the first listed quality.
pub fn select_default_quality(qualities: &[Quality]) -> Option<&Quality> {
    qualities
        .iter()
        .find(|quality| quality.resolution == PREFERRED_QUALITY)
        .or_else(|| qualities.first())
}

/// The quality-switch button row placed next to the media element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityControls {
    pub options: Vec<Quality>,
    pub active: String,
}

impl QualityControls {
    pub fn new(options: Vec<Quality>, active: impl Into<String>) -> Self {
        Self {
            options,
            active: active.into(),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options
            .iter()
            .map(|quality| quality.resolution.as_str())
            .collect()
    }

    pub fn find(&self, resolution: &str) -> Option<&Quality> {
        self.options
            .iter()
            .find(|quality| quality.resolution == resolution)
    }
}
