use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Html,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::db::NewEvent;
use crate::error::{MessageBody, ViewerError};
use crate::render::render;
use crate::router::ViewerState;

/// GET / -> latest events as an HTML table.
///
/// Every request resolves fresh credentials, opens its own connection and
/// renders from scratch; any failure short-circuits to the error response.
pub async fn events_page_handler(
    State(state): State<ViewerState>,
) -> Result<Html<String>, ViewerError> {
    let cfg = state.assembler.assemble_config().await?;
    let rows = state.fetcher.fetch_rows(&cfg).await?;
    debug!(count = rows.len(), "rendering events page");
    Ok(Html(render(&rows)))
}

/// POST /events -> validate and store one device event. Unparseable bodies
/// get the same 400 as incomplete ones.
pub async fn ingest_event_handler(
    State(state): State<ViewerState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageBody>, ViewerError> {
    let Json(payload) = payload.map_err(|e| ViewerError::InvalidEvent(e.body_text()))?;
    let event = NewEvent::from_payload(&payload)?;
    let cfg = state.assembler.assemble_config().await?;
    let id = state.fetcher.insert_event(&cfg, &event).await?;
    info!(
        id,
        device_id = %event.device_id,
        event_type = %event.event_type,
        "event stored"
    );
    if event.is_high_temperature() {
        warn!(
            device_id = %event.device_id,
            value = event.value,
            "high temperature detected"
        );
    }
    Ok(Json(MessageBody {
        message: "Event processed successfully".to_string(),
    }))
}

/// GET /healthz -> liveness only; touches no external service.
pub async fn health_handler() -> &'static str {
    "ok"
}
