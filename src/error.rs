use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::{error, warn};

#[derive(Debug, ThisError)]
pub enum ViewerError {
    #[error("parameter {name} not found")]
    SecretNotFound { name: String },

    #[error("failed to read parameter {name}: {message}")]
    SecretAccess { name: String, message: String },

    #[error("parameter {name} resolved to an empty value")]
    EmptyParameter { name: String },

    /// One of the five lookups failed; carries the first failure unchanged.
    #[error(transparent)]
    ConfigResolution(Box<ViewerError>),

    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    #[error("database connection failed: {0}")]
    Connection(#[source] SqlxError),

    #[error("query failed: {0}")]
    Query(#[source] SqlxError),

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    #[error("invalid event data: {0}")]
    InvalidEvent(String),
}

impl ViewerError {
    /// Wrap a lookup failure as a configuration failure. Already-wrapped
    /// errors pass through untouched.
    pub fn config_resolution(err: ViewerError) -> Self {
        match err {
            wrapped @ ViewerError::ConfigResolution(_) => wrapped,
            other => ViewerError::ConfigResolution(Box::new(other)),
        }
    }

    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        ViewerError::Timeout {
            operation: operation.into(),
            after,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ViewerError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ViewerError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match self {
            ViewerError::InvalidEvent(reason) => {
                warn!(reason = %reason, "rejected event payload");
                (
                    status,
                    Json(MessageBody {
                        message: "Invalid event data".to_string(),
                    }),
                )
                    .into_response()
            }
            other => {
                error!(error = %other, "request pipeline failed");
                (status, Html(format!("Error: {other}"))).into_response()
            }
        }
    }
}

/// `{"message": "..."}` body used by the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn config_resolution_keeps_inner_message() {
        let inner = ViewerError::SecretAccess {
            name: "/tryout1/RDSHost".to_string(),
            message: "AccessDeniedException: not authorized".to_string(),
        };
        let expected = inner.to_string();
        let wrapped = ViewerError::config_resolution(inner);
        assert_eq!(wrapped.to_string(), expected);

        let rewrapped = ViewerError::config_resolution(wrapped);
        assert!(matches!(
            rewrapped,
            ViewerError::ConfigResolution(ref inner) if matches!(**inner, ViewerError::SecretAccess { .. })
        ));
    }

    #[test]
    fn timeout_message_names_operation() {
        let err = ViewerError::timeout("database connect", Duration::from_secs(10));
        assert_eq!(err.to_string(), "database connect timed out after 10s");
    }

    #[tokio::test]
    async fn pipeline_errors_render_as_500_with_prefix() {
        let resp = ViewerError::SecretNotFound {
            name: "/tryout1/RDSTable".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Error: parameter /tryout1/RDSTable not found");
    }

    #[tokio::test]
    async fn invalid_event_renders_as_400_json() {
        let resp = ViewerError::InvalidEvent("missing device_id".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"message":"Invalid event data"}"#);
    }
}
