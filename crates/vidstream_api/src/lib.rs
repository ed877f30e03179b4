pub mod api;
pub mod http;
pub mod memory;

pub use api::{ApiError, VideoApi};
pub use http::HttpVideoApi;
pub use memory::{ApiCall, InMemoryVideoApi};
