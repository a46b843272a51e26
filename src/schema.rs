//! Log record model
//!
//! A record is one line of newline-delimited JSON. The only field the merger
//! interprets is the timestamp; everything else is carried through untouched,
//! and the original line text is what gets written to the merged output.

use crate::config::{DEFAULT_TIMESTAMP_FIELD, DEFAULT_TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::fmt::Write;

/// One parsed log line
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Comparison key for the merge
    timestamp: NaiveDateTime,
    /// Parsed JSON object
    fields: Map<String, Value>,
    /// Original line, without its terminator
    line: String,
}

impl LogRecord {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The record as it appeared in its source
    pub fn as_line(&self) -> &str {
        &self.line
    }

    pub fn into_line(self) -> String {
        self.line
    }
}

/// Why a line could not become a [`LogRecord`]
#[derive(Debug)]
pub enum DecodeError {
    Json(serde_json::Error),
    Schema(String),
}

/// Where the timestamp lives and how it is spelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    field: String,
    format: String,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FIELD, DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl RecordFormat {
    pub fn new(field: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            format: format.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Parse a timestamp string, requiring it to match the format exactly
    ///
    /// chrono accepts unpadded numbers (`2024-1-5`) and a few other loose
    /// spellings, so the parsed value must format back to the same text.
    /// A format a naive timestamp cannot be written in (`%z`) never matches.
    pub fn parse_timestamp(&self, raw: &str) -> Option<NaiveDateTime> {
        let parsed = NaiveDateTime::parse_from_str(raw, &self.format).ok()?;
        let mut round_trip = String::with_capacity(raw.len());
        write!(round_trip, "{}", parsed.format(&self.format)).ok()?;
        (round_trip == raw).then_some(parsed)
    }

    /// Decode one line (terminator already stripped) into a record
    pub fn decode(&self, line: &str) -> Result<LogRecord, DecodeError> {
        self.decode_bytes(line.as_bytes())
    }

    /// Decode raw line bytes; invalid UTF-8 is reported as a JSON error
    pub fn decode_bytes(&self, line: &[u8]) -> Result<LogRecord, DecodeError> {
        let value: Value = serde_json::from_slice(line).map_err(DecodeError::Json)?;

        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(DecodeError::Schema(format!(
                    "record is a JSON {}, expected an object",
                    json_kind(&other)
                )))
            }
        };

        let raw = match fields.get(&self.field) {
            Some(Value::String(raw)) => raw,
            Some(other) => {
                return Err(DecodeError::Schema(format!(
                    "`{}` field is a JSON {}, expected a string",
                    self.field,
                    json_kind(other)
                )))
            }
            None => {
                return Err(DecodeError::Schema(format!(
                    "missing `{}` field",
                    self.field
                )))
            }
        };

        let timestamp = self.parse_timestamp(raw).ok_or_else(|| {
            DecodeError::Schema(format!(
                "`{}` value {:?} does not match format {:?}",
                self.field, raw, self.format
            ))
        })?;

        // serde_json has already rejected any invalid UTF-8
        let line = String::from_utf8_lossy(line).into_owned();

        Ok(LogRecord {
            timestamp,
            fields,
            line,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
