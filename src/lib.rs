//! Log Merger library components
//!
//! Streams several timestamp-ordered JSONL logs and merges them into one
//! ordered log without loading any input fully into memory.

pub mod config;
pub mod error;
pub mod job;
pub mod merge;
pub mod merged_writer;
pub mod preflight;
pub mod record_stream;
pub mod schema;

// Re-export commonly used types
pub use config::MergeConfig;
pub use error::{MergeError, Result};
pub use job::{MergeJob, MergeSummary};
pub use merge::{merge, MergeEngine};
pub use merged_writer::MergedLogWriter;
pub use record_stream::{FileRecordStream, RecordSource, RecordStream};
pub use schema::{LogRecord, RecordFormat};
