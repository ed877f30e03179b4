pub mod app;
pub mod bus;

pub use app::VideoApp;
pub use bus::{EventBus, EVENT_BUS_CAPACITY};
