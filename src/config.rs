//! Configuration for merge runs

use crate::error::{MergeError, Result};
use crate::schema::RecordFormat;
use chrono::format::{Fixed, Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMESTAMP_FIELD: &str = "timestamp";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const ENV_TIMESTAMP_FIELD: &str = "LOG_MERGER_TIMESTAMP_FIELD";
pub const ENV_TIMESTAMP_FORMAT: &str = "LOG_MERGER_TIMESTAMP_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,

    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    #[serde(default = "default_buffer_bytes")]
    pub read_buffer_bytes: usize,

    #[serde(default = "default_buffer_bytes")]
    pub write_buffer_bytes: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            timestamp_field: default_timestamp_field(),
            timestamp_format: default_timestamp_format(),
            read_buffer_bytes: default_buffer_bytes(),
            write_buffer_bytes: default_buffer_bytes(),
        }
    }
}

impl MergeConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MergeError::Config(format!(
                "failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: MergeConfig = toml::from_str(&contents).map_err(|e| {
            MergeError::Config(format!(
                "failed to parse configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply environment overrides on top of `self`
    pub fn with_env(mut self) -> Self {
        if let Ok(field) = std::env::var(ENV_TIMESTAMP_FIELD) {
            if !field.is_empty() {
                self.timestamp_field = field;
            }
        }

        if let Ok(format) = std::env::var(ENV_TIMESTAMP_FORMAT) {
            if !format.is_empty() {
                self.timestamp_format = format;
            }
        }

        self
    }

    /// File (if any), then environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timestamp_field.is_empty() {
            return Err(MergeError::Config(
                "timestamp_field must not be empty".to_string(),
            ));
        }
        if self.timestamp_format.is_empty() {
            return Err(MergeError::Config(
                "timestamp_format must not be empty".to_string(),
            ));
        }
        if self.read_buffer_bytes == 0 || self.write_buffer_bytes == 0 {
            return Err(MergeError::Config(
                "buffer sizes must be greater than zero".to_string(),
            ));
        }
        check_timestamp_format(&self.timestamp_format)
    }

    pub fn record_format(&self) -> RecordFormat {
        RecordFormat::new(&self.timestamp_field, &self.timestamp_format)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MergeError::Config(format!("failed to serialize configuration: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| MergeError::io(path.display().to_string(), e))
    }
}

/// Timestamps are naive, so the format may not name an offset or zone
fn check_timestamp_format(format: &str) -> Result<()> {
    for item in StrftimeItems::new(format) {
        match item {
            Item::Error => {
                return Err(MergeError::Config(format!(
                    "timestamp_format {:?} is not a valid strftime format",
                    format
                )))
            }
            Item::Fixed(
                Fixed::TimezoneName
                | Fixed::TimezoneOffset
                | Fixed::TimezoneOffsetZ
                | Fixed::TimezoneOffsetColon
                | Fixed::TimezoneOffsetColonZ
                | Fixed::TimezoneOffsetDoubleColon
                | Fixed::TimezoneOffsetTripleColon
                | Fixed::RFC2822
                | Fixed::RFC3339,
            ) => {
                return Err(MergeError::Config(format!(
                    "timestamp_format {:?} names a time zone; only naive timestamps are supported",
                    format
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

fn default_timestamp_field() -> String {
    DEFAULT_TIMESTAMP_FIELD.to_string()
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_buffer_bytes() -> usize {
    8192
}
