pub mod events;

pub use events::{events_page_handler, health_handler, ingest_event_handler};
