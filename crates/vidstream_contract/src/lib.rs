pub mod endpoints;
pub mod events;
pub mod upload;
pub mod video;

pub use endpoints::StreamSource;
pub use events::{ClientEvent, EventSink, Notifier};
pub use upload::{
    ChunkAck, ChunkUpload, CompleteUploadRequest, InitUploadRequest, InitUploadResponse,
    UploadSession, DEFAULT_CHUNK_SIZE,
};
pub use video::{Quality, Video, VideoId, VideoStatus};
