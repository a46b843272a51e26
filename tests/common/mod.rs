//! Common test utilities and helpers

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::json;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Base instant all generated timestamps are offset from
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One JSONL record `base_time() + offset_secs`, tagged with its origin
pub fn record_line(offset_secs: i64, stream: usize, seq: usize) -> String {
    let ts = base_time() + Duration::seconds(offset_secs);
    json!({
        "timestamp": ts.format(TIMESTAMP_FORMAT).to_string(),
        "stream": stream,
        "seq": seq,
        "msg": format!("stream {} record {}", stream, seq),
    })
    .to_string()
}

/// Write lines to `dir/name`, one per line, and return the path
pub fn write_lines(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut file = BufWriter::new(File::create(&path).expect("Failed to create log file"));
    for line in lines {
        writeln!(file, "{}", line).expect("Failed to write line");
    }
    file.flush().expect("Failed to flush file");
    path
}

/// Write a stream whose records sit at the given offsets (must be sorted)
#[allow(dead_code)]
pub fn write_stream(dir: &Path, stream: usize, offsets: &[i64]) -> PathBuf {
    let lines: Vec<String> = offsets
        .iter()
        .enumerate()
        .map(|(seq, offset)| record_line(*offset, stream, seq))
        .collect();
    write_lines(dir, &format!("stream-{}.jsonl", stream), &lines)
}

/// Read a JSONL file back as parsed values
pub fn read_records(path: &Path) -> Vec<serde_json::Value> {
    let content = fs::read_to_string(path).expect("Failed to read merged log");
    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .unwrap_or_else(|e| panic!("line {} is not JSON: {}\nLine: {}", i + 1, e, line))
        })
        .collect()
}

/// `(stream, seq)` origin tags of each merged record
#[allow(dead_code)]
pub fn origins(records: &[serde_json::Value]) -> Vec<(u64, u64)> {
    records
        .iter()
        .map(|r| (r["stream"].as_u64().unwrap(), r["seq"].as_u64().unwrap()))
        .collect()
}

/// Parsed timestamps of each merged record
#[allow(dead_code)]
pub fn timestamps(records: &[serde_json::Value]) -> Vec<NaiveDateTime> {
    records
        .iter()
        .map(|r| {
            NaiveDateTime::parse_from_str(r["timestamp"].as_str().unwrap(), TIMESTAMP_FORMAT)
                .unwrap()
        })
        .collect()
}

/// Run the merge-logs binary with the given arguments
#[allow(dead_code)]
pub fn run_merge_logs<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_merge-logs"))
        .args(args)
        .env_remove("LOG_MERGER_TIMESTAMP_FIELD")
        .env_remove("LOG_MERGER_TIMESTAMP_FORMAT")
        .output()
        .expect("Failed to run merge-logs")
}
