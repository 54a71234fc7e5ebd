use super::connection::{EventConnection, EventConnector};
use super::models::{EventRow, NewEvent};
use super::table::TableName;
use crate::config::Timeouts;
use crate::error::ViewerError;
use crate::secrets::DatabaseConfig;
use sqlx::Error as SqlxError;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs one statement per connection. The connection is closed on every
/// exit path once it has been opened, including statement failure and
/// statement timeout.
#[derive(Clone)]
pub struct RowFetcher {
    connector: Arc<dyn EventConnector>,
    timeouts: Timeouts,
}

impl RowFetcher {
    pub fn new(connector: Arc<dyn EventConnector>, timeouts: Timeouts) -> Self {
        Self {
            connector,
            timeouts,
        }
    }

    pub async fn fetch_rows(&self, cfg: &DatabaseConfig) -> Result<Vec<EventRow>, ViewerError> {
        let table = TableName::parse(&cfg.table)?;
        let mut conn = self.connect(cfg).await?;

        let result = self
            .bounded("event query", conn.fetch_events(&table))
            .await;
        self.release(conn).await;

        let rows = result?;
        debug!(table = %table, count = rows.len(), "events fetched");
        Ok(rows)
    }

    pub async fn insert_event(
        &self,
        cfg: &DatabaseConfig,
        event: &NewEvent,
    ) -> Result<u64, ViewerError> {
        let table = TableName::parse(&cfg.table)?;
        let mut conn = self.connect(cfg).await?;

        let result = self
            .bounded("event insert", conn.insert_event(&table, event))
            .await;
        self.release(conn).await;

        let id = result?;
        debug!(table = %table, id, "event inserted");
        Ok(id)
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<Box<dyn EventConnection>, ViewerError> {
        let after = self.timeouts.connect;
        tokio::time::timeout(after, self.connector.connect(cfg))
            .await
            .map_err(|_| ViewerError::timeout("database connect", after))?
            .map_err(ViewerError::Connection)
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T, SqlxError>>,
    ) -> Result<T, ViewerError> {
        let after = self.timeouts.query;
        tokio::time::timeout(after, fut)
            .await
            .map_err(|_| ViewerError::timeout(operation, after))?
            .map_err(ViewerError::Query)
    }

    /// Close is bounded by the statement deadline. Close failures are
    /// logged, never surfaced: the statement result wins.
    async fn release(&self, conn: Box<dyn EventConnection>) {
        match tokio::time::timeout(self.timeouts.query, conn.close()).await {
            Ok(Ok(())) => debug!("database connection closed"),
            Ok(Err(e)) => warn!(error = %e, "failed to close database connection"),
            Err(_) => warn!("timed out closing database connection; dropping it"),
        }
    }
}
