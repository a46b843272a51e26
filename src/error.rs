//! Error taxonomy for merge runs
//!
//! Every error is fatal to the merge that raised it. Nothing in the library
//! retries or skips a malformed record.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating, reading or writing logs
#[derive(Debug, Error)]
pub enum MergeError {
    /// Bad flags or paths, detected before any input is opened
    #[error("configuration error: {0}")]
    Config(String),

    /// An input could not be opened
    #[error("cannot open {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line is not valid JSON
    #[error("{source_name}:{line}: invalid JSON: {source}")]
    Parse {
        source_name: String,
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    /// A record has no usable timestamp field
    #[error("{source_name}:{line}: {reason}")]
    Schema {
        source_name: String,
        line: u64,
        reason: String,
    },

    /// Read or write failure on a source or the sink
    #[error("I/O error on {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: io::Error,
    },
}

impl MergeError {
    pub(crate) fn io(target: impl Into<String>, source: io::Error) -> Self {
        MergeError::Io {
            target: target.into(),
            source,
        }
    }

    /// True for errors raised during pre-flight, before any output exists
    pub fn is_config(&self) -> bool {
        matches!(self, MergeError::Config(_))
    }
}

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;
