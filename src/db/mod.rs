//! Database access: one short-lived MySQL connection per statement.
//!
//! Layout:
//! - `models.rs`: event rows as rendered, and validated inbound events
//! - `table.rs`: checked table identifiers for query text
//! - `connection.rs`: connector/connection seams
//! - `mysql.rs`: sqlx-backed MySQL implementation
//! - `fetcher.rs`: timeouts and guaranteed release around each statement

pub mod connection;
pub mod fetcher;
pub mod models;
pub mod mysql;
pub mod table;

pub use connection::{EventConnection, EventConnector};
pub use fetcher::RowFetcher;
pub use models::{EventRow, NewEvent};
pub use mysql::MySqlConnector;
pub use table::TableName;
