use super::connection::{EventConnection, EventConnector};
use super::models::{EventRow, NewEvent};
use super::table::TableName;
use crate::secrets::DatabaseConfig;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Error as SqlxError, Row, TypeInfo, ValueRef};
use tracing::warn;

/// Connects to MySQL/MariaDB with the resolved credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

#[async_trait]
impl EventConnector for MySqlConnector {
    async fn connect(&self, cfg: &DatabaseConfig) -> Result<Box<dyn EventConnection>, SqlxError> {
        let conn = connect_options(cfg).connect().await?;
        Ok(Box::new(MySqlEventConnection { conn }))
    }
}

/// `host` may carry an explicit `:port`; otherwise the driver default applies.
fn connect_options(cfg: &DatabaseConfig) -> MySqlConnectOptions {
    let mut opts = MySqlConnectOptions::new()
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.database);
    match split_host_port(&cfg.host) {
        (host, Some(port)) => opts = opts.host(host).port(port),
        (host, None) => opts = opts.host(host),
    }
    opts
}

fn split_host_port(raw: &str) -> (&str, Option<u16>) {
    let raw = raw.trim();
    // `[v6]` or `[v6]:port`
    if let Some(rest) = raw.strip_prefix('[')
        && let Some((host, tail)) = rest.split_once(']')
    {
        let port = tail.strip_prefix(':').and_then(|p| p.parse::<u16>().ok());
        return (host, port);
    }
    // A bare IPv6 address has more than one colon and never carries a port.
    if raw.matches(':').count() == 1
        && let Some((host, port)) = raw.split_once(':')
        && let Ok(port) = port.parse::<u16>()
    {
        return (host, Some(port));
    }
    (raw, None)
}

pub struct MySqlEventConnection {
    conn: MySqlConnection,
}

#[async_trait]
impl EventConnection for MySqlEventConnection {
    async fn fetch_events(&mut self, table: &TableName) -> Result<Vec<EventRow>, SqlxError> {
        let sql = format!("SELECT * FROM {table} ORDER BY id DESC");
        let rows = sqlx::query(&sql)
            .persistent(false)
            .fetch_all(&mut self.conn)
            .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn insert_event(
        &mut self,
        table: &TableName,
        event: &NewEvent,
    ) -> Result<u64, SqlxError> {
        let sql = format!(
            "INSERT INTO {table} (device_id, event_type, value, value_celsius, `timestamp`) \
             VALUES (?, ?, ?, ?, ?)"
        );
        let done = sqlx::query(&sql)
            .persistent(false)
            .bind(&event.device_id)
            .bind(&event.event_type)
            .bind(event.value)
            .bind(event.value_celsius)
            .bind(event.timestamp)
            .execute(&mut self.conn)
            .await?;
        Ok(done.last_insert_id())
    }

    async fn close(self: Box<Self>) -> Result<(), SqlxError> {
        self.conn.close().await
    }
}

fn event_from_row(row: &MySqlRow) -> Result<EventRow, SqlxError> {
    Ok(EventRow {
        id: column_id(row)?,
        device_id: column_text(row, "device_id")?,
        event_type: column_text(row, "event_type")?,
        value: column_text(row, "value")?,
        timestamp: column_text(row, "timestamp")?,
    })
}

fn column_id(row: &MySqlRow) -> Result<i64, SqlxError> {
    match row.try_get::<i64, _>("id") {
        Ok(id) => Ok(id),
        Err(SqlxError::ColumnDecode { .. }) => {
            let id: u64 = row.try_get("id")?;
            i64::try_from(id).map_err(|e| SqlxError::Decode(Box::new(e)))
        }
        Err(e) => Err(e),
    }
}

/// How a column's binary-protocol value is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    Year,
    Float,
    Double,
    DateTime,
    Date,
    Time,
    Bit,
    /// VARCHAR, TEXT, DECIMAL, ENUM, JSON, and the BLOB/BINARY family.
    Bytes,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "BOOLEAN" => ColumnKind::Bool,
        "YEAR" => ColumnKind::Year,
        "BIT" => ColumnKind::Bit,
        "FLOAT" => ColumnKind::Float,
        "DOUBLE" => ColumnKind::Double,
        "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        t if t.contains("INT") && t.ends_with("UNSIGNED") => ColumnKind::Unsigned,
        t if t.contains("INT") => ColumnKind::Signed,
        _ => ColumnKind::Bytes,
    }
}

/// Render any column as the text a client would display. NULL becomes "",
/// and so does a value the driver cannot decode.
fn column_text(row: &MySqlRow, name: &str) -> Result<String, SqlxError> {
    let type_name = row.try_column(name)?.type_info().name().to_string();
    if row.try_get_raw(name)?.is_null() {
        return Ok(String::new());
    }

    match decode_column(row, name, column_kind(&type_name)) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(column = name, type_name = %type_name, error = %e, "rendering undecodable column as empty");
            Ok(String::new())
        }
    }
}

fn decode_column(row: &MySqlRow, name: &str, kind: ColumnKind) -> Result<String, SqlxError> {
    let text = match kind {
        ColumnKind::Bool => row.try_get::<bool, _>(name)?.to_string(),
        ColumnKind::Signed => row.try_get::<i64, _>(name)?.to_string(),
        ColumnKind::Unsigned => row.try_get::<u64, _>(name)?.to_string(),
        ColumnKind::Year => row.try_get_unchecked::<u16, _>(name)?.to_string(),
        ColumnKind::Float => row.try_get::<f32, _>(name)?.to_string(),
        ColumnKind::Double => row.try_get::<f64, _>(name)?.to_string(),
        ColumnKind::DateTime => row
            .try_get_unchecked::<NaiveDateTime, _>(name)?
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        ColumnKind::Date => row.try_get_unchecked::<NaiveDate, _>(name)?.to_string(),
        ColumnKind::Time => row.try_get_unchecked::<NaiveTime, _>(name)?.to_string(),
        ColumnKind::Bit => bits_to_u64(&row.try_get_unchecked::<Vec<u8>, _>(name)?).to_string(),
        ColumnKind::Bytes => bytes_to_text(&row.try_get_unchecked::<Vec<u8>, _>(name)?),
    };
    Ok(text)
}

/// BIT(n) arrives big-endian, at most eight bytes.
fn bits_to_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

fn bytes_to_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_port_split() {
        assert_eq!(split_host_port("db.internal"), ("db.internal", None));
        assert_eq!(split_host_port("db.internal:3307"), ("db.internal", Some(3307)));
        assert_eq!(split_host_port(" db.internal "), ("db.internal", None));
        assert_eq!(split_host_port("db.internal:abc"), ("db.internal:abc", None));
        assert_eq!(split_host_port("10.0.0.7:3306"), ("10.0.0.7", Some(3306)));
    }

    #[test]
    fn ipv6_hosts_keep_their_colons() {
        assert_eq!(split_host_port("2001:db8::5"), ("2001:db8::5", None));
        assert_eq!(split_host_port("::1"), ("::1", None));
        assert_eq!(split_host_port("[2001:db8::5]:3307"), ("2001:db8::5", Some(3307)));
        assert_eq!(split_host_port("[2001:db8::5]"), ("2001:db8::5", None));
    }

    #[test]
    fn column_kinds_cover_binary_and_year_types() {
        assert_eq!(column_kind("YEAR"), ColumnKind::Year);
        assert_eq!(column_kind("BIT"), ColumnKind::Bit);
        assert_eq!(column_kind("VARBINARY"), ColumnKind::Bytes);
        assert_eq!(column_kind("BLOB"), ColumnKind::Bytes);
        assert_eq!(column_kind("DECIMAL"), ColumnKind::Bytes);
        assert_eq!(column_kind("INT UNSIGNED"), ColumnKind::Unsigned);
        assert_eq!(column_kind("BIGINT"), ColumnKind::Signed);
        assert_eq!(column_kind("TIMESTAMP"), ColumnKind::DateTime);
    }

    #[test]
    fn bit_and_binary_values_render_as_text() {
        assert_eq!(bits_to_u64(&[0x01, 0x02]), 258);
        assert_eq!(bits_to_u64(&[]), 0);
        assert_eq!(bytes_to_text(b"21.50"), "21.50");
        assert_eq!(bytes_to_text(&[0x64, 0xff, 0x31]), "d\u{fffd}1");
    }

    #[test]
    fn connect_options_carry_credentials() {
        let cfg = DatabaseConfig {
            host: "db.internal:3307".to_string(),
            user: "admin".to_string(),
            password: "pw".to_string(),
            database: "iot".to_string(),
            table: "events".to_string(),
        };
        let opts = connect_options(&cfg);
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 3307);
        assert_eq!(opts.get_username(), "admin");
        assert_eq!(opts.get_database(), Some("iot"));
    }
}
