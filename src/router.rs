use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::config::{ParameterNames, Timeouts};
use crate::db::{EventConnector, RowFetcher};
use crate::handlers::{events_page_handler, health_handler, ingest_event_handler};
use crate::secrets::{ConfigAssembler, SecretResolver};

/// Shared handles only; nothing request-scoped lives here.
#[derive(Clone)]
pub struct ViewerState {
    pub assembler: ConfigAssembler,
    pub fetcher: RowFetcher,
}

impl ViewerState {
    pub fn new(
        resolver: Arc<dyn SecretResolver>,
        connector: Arc<dyn EventConnector>,
        names: ParameterNames,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            assembler: ConfigAssembler::new(resolver, names, timeouts.secret),
            fetcher: RowFetcher::new(connector, timeouts),
        }
    }
}

pub fn viewer_router(state: ViewerState) -> Router {
    Router::new()
        .route("/", get(events_page_handler))
        .route("/events", post(ingest_event_handler))
        .route("/healthz", get(health_handler))
        .with_state(state)
}
