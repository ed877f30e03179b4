use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Media runtime code for a container/stream the runtime could not parse.
pub const DEMUXER_ERROR_CODE: u16 = 4;

/// Classification of the numeric error a media element reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackError {
    Aborted,
    Network,
    Decode,
    Demuxer,
    Unknown(u16),
}

impl PlaybackError {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Aborted,
            2 => Self::Network,
            3 => Self::Decode,
            DEMUXER_ERROR_CODE => Self::Demuxer,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Aborted => 1,
            Self::Network => 2,
            Self::Decode => 3,
            Self::Demuxer => DEMUXER_ERROR_CODE,
            Self::Unknown(code) => *code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Option<Duration>,
}

impl Default for RetryPolicy {
    /// One blind reload on demuxer errors, immediately.
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: None,
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, error: PlaybackError) -> bool {
        matches!(error, PlaybackError::Demuxer)
    }

    pub fn should_retry(&self, error: PlaybackError, retries_used: u32) -> bool {
        self.is_retryable(error) && retries_used < self.max_retries
    }
}
