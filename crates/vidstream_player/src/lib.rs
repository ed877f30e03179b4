pub mod error;
pub mod media;
pub mod player;
pub mod quality;

pub use error::{PlaybackError, RetryPolicy, DEMUXER_ERROR_CODE};
pub use media::{HeadlessMedia, MediaElement, PlayRejected};
pub use player::{MediaErrorOutcome, PlayerError, VideoPlayer};
pub use quality::{select_default_quality, QualityControls, PREFERRED_QUALITY};
