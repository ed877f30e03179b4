use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Idle,
    Uploading,
    Processing,
    Success,
    Failed,
}

pub const IDLE_LABEL: &str = "Upload";
pub const BUSY_LABEL: &str = "Uploading...";

/// View model for the progress bar and its trigger button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadControls {
    pub progress: f64,
    pub trigger_enabled: bool,
    pub trigger_label: String,
    pub status: TransferStatus,
}

impl Default for UploadControls {
    fn default() -> Self {
        Self {
            progress: 0.0,
            trigger_enabled: true,
            trigger_label: IDLE_LABEL.to_string(),
            status: TransferStatus::Idle,
        }
    }
}

impl UploadControls {
    /// Trigger is disabled strictly while `0 < progress < 100`.
    pub fn update_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 100.0);
        let busy = self.progress > 0.0 && self.progress < 100.0;
        self.trigger_enabled = !busy;
        self.trigger_label = if busy { BUSY_LABEL } else { IDLE_LABEL }.to_string();
    }

    pub fn set_status(&mut self, status: TransferStatus) {
        self.status = status;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
