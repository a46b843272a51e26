//! Common utilities for benchmarks

use chrono::{Duration, NaiveDate};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory for benchmark inputs
pub fn create_bench_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// One realistic record; timestamps advance one second per `offset`
pub fn record_line(offset: u64, stream: usize) -> String {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid base date");
    let ts = base + Duration::seconds(offset as i64);
    format!(
        r#"{{"timestamp":"{}","level":"INFO","stream":{},"msg":"request handled in {} ms"}}"#,
        ts.format("%Y-%m-%d %H:%M:%S"),
        stream,
        offset % 500
    )
}

/// In-memory JSONL text for one stream of `entries` records
///
/// Streams are offset from each other so every merge step has to compare,
/// and every `stream_count`th second is shared to exercise ties.
pub fn stream_text(stream: usize, stream_count: usize, entries: usize) -> String {
    let mut text = String::with_capacity(entries * 96);
    for i in 0..entries {
        let offset = (i * stream_count + stream / 2) as u64;
        text.push_str(&record_line(offset, stream));
        text.push('\n');
    }
    text
}

/// Write one stream to `dir/stream-N.jsonl`
pub fn create_stream_file(dir: &Path, stream: usize, stream_count: usize, entries: usize) -> PathBuf {
    let path = dir.join(format!("stream-{}.jsonl", stream));
    let mut file = BufWriter::new(File::create(&path).expect("Failed to create log file"));
    file.write_all(stream_text(stream, stream_count, entries).as_bytes())
        .expect("Failed to write stream");
    file.flush().expect("Failed to flush file");
    path
}
