pub mod list;
pub mod view;

pub use list::VideoList;
pub use view::{status_label, BadgeTone, CatalogView, VideoCard, EMPTY_MESSAGE, LOAD_ERROR_MESSAGE};
