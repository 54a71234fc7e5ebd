use crate::error::ViewerError;
use std::fmt;

const MAX_IDENT_LEN: usize = 64;

/// A table identifier that is safe to splice into query text.
///
/// Identifiers cannot be bound as parameters, so the name is checked
/// against `[A-Za-z0-9_$]` (optionally `schema.table`) and rendered
/// back-quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: Option<String>,
    table: String,
}

impl TableName {
    pub fn parse(raw: &str) -> Result<Self, ViewerError> {
        let invalid = || ViewerError::InvalidTableName(raw.to_string());
        let mut parts = raw.trim().split('.');
        let (schema, table) = match (parts.next(), parts.next(), parts.next()) {
            (Some(table), None, None) => (None, table),
            (Some(schema), Some(table), None) => (Some(schema), table),
            _ => return Err(invalid()),
        };
        if !schema.is_none_or(is_plain_ident) || !is_plain_ident(table) {
            return Err(invalid());
        }
        Ok(Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        })
    }
}

fn is_plain_ident(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_IDENT_LEN
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "`{schema}`.`{}`", self.table),
            None => write!(f, "`{}`", self.table),
        }
    }
}
