use crate::error::ViewerError;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Wire format of inbound event timestamps.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Temperatures above this (°F, as received) are logged as alerts on ingest.
pub const HIGH_TEMPERATURE_THRESHOLD: f64 = 100.0;

/// One persisted device event, with every column rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    pub id: i64,
    pub device_id: String,
    pub event_type: String,
    pub value: String,
    pub timestamp: String,
}

/// A validated event ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub device_id: String,
    pub event_type: String,
    pub value: f64,
    /// Only set for `temperature` events (input assumed Fahrenheit).
    pub value_celsius: Option<f64>,
    pub timestamp: NaiveDateTime,
}

impl NewEvent {
    /// Validate a JSON event of the shape
    /// `{"device_id", "event_type", "value", "timestamp"}`.
    pub fn from_payload(payload: &Value) -> Result<Self, ViewerError> {
        let device_id = required_str(payload, "device_id")?;
        let event_type = required_str(payload, "event_type")?;
        let value = required_number(payload, "value")?;
        let raw_ts = required_str(payload, "timestamp")?;
        let timestamp = NaiveDateTime::parse_from_str(&raw_ts, EVENT_TIMESTAMP_FORMAT)
            .map_err(|e| ViewerError::InvalidEvent(format!("timestamp {raw_ts:?}: {e}")))?;

        let value_celsius = (event_type == "temperature").then(|| fahrenheit_to_celsius(value));

        Ok(Self {
            device_id,
            event_type,
            value,
            value_celsius,
            timestamp,
        })
    }

    pub fn is_high_temperature(&self) -> bool {
        self.event_type == "temperature" && self.value > HIGH_TEMPERATURE_THRESHOLD
    }
}

fn required_str(payload: &Value, field: &str) -> Result<String, ViewerError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ViewerError::InvalidEvent(format!("missing {field}")))
}

fn required_number(payload: &Value, field: &str) -> Result<f64, ViewerError> {
    let value = payload.get(field).and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ViewerError::InvalidEvent(format!("missing {field}"))),
    }
}

/// Rounded to two decimals.
fn fahrenheit_to_celsius(f: f64) -> f64 {
    ((f - 32.0) * 5.0 / 9.0 * 100.0).round() / 100.0
}
