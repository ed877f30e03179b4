pub mod plan;
pub mod poll;
pub mod progress;
pub mod source;
pub mod uploader;

pub use plan::ChunkPlan;
pub use poll::{PollConfig, PollHandle, PollOutcome, ReadinessPoll, MAX_POLL_ATTEMPTS, POLL_INTERVAL};
pub use progress::{TransferStatus, UploadControls};
pub use source::UploadSource;
pub use uploader::{UploadError, UploadReport, VideoUploader, NO_FILE_MESSAGE, SUCCESS_MESSAGE};
