use super::models::{EventRow, NewEvent};
use super::table::TableName;
use crate::secrets::DatabaseConfig;
use async_trait::async_trait;
use sqlx::Error as SqlxError;

/// Opens one short-lived connection per call. No pooling.
#[async_trait]
pub trait EventConnector: Send + Sync {
    async fn connect(&self, cfg: &DatabaseConfig) -> Result<Box<dyn EventConnection>, SqlxError>;
}

#[async_trait]
pub trait EventConnection: Send {
    /// `SELECT * FROM <table> ORDER BY id DESC`
    async fn fetch_events(&mut self, table: &TableName) -> Result<Vec<EventRow>, SqlxError>;

    /// Insert one row, returning its id.
    async fn insert_event(&mut self, table: &TableName, event: &NewEvent)
    -> Result<u64, SqlxError>;

    async fn close(self: Box<Self>) -> Result<(), SqlxError>;
}
