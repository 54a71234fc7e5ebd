pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod secrets;

pub use error::ViewerError;
pub use router::{ViewerState, viewer_router};
