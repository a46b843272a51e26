//! Lazy, forward-only record streams over newline-delimited JSON
//!
//! A stream holds one line buffer and its reader; it never looks further
//! ahead than the record being decoded, so memory per stream does not grow
//! with the size of the source.

use crate::error::{MergeError, Result};
use crate::schema::{DecodeError, LogRecord, RecordFormat};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const DEFAULT_READ_BUFFER: usize = 8192;

/// Anything the merge engine can pull records from
pub trait RecordSource {
    /// Label used in logs and error messages
    fn name(&self) -> &str;

    /// Next record in source order, or `None` once the source is exhausted
    ///
    /// After `None` has been returned every later call returns `None` again.
    fn next_record(&mut self) -> Result<Option<LogRecord>>;
}

/// Stream opened from a path on disk
pub type FileRecordStream = RecordStream<Box<dyn BufRead + Send>>;

pub struct RecordStream<R> {
    name: String,
    /// `None` once exhausted; dropping the reader closes the source
    reader: Option<R>,
    format: RecordFormat,
    line: Vec<u8>,
    line_number: u64,
}

impl FileRecordStream {
    /// Open a log file; paths ending in `.gz` are decompressed while reading
    pub fn open(path: impl AsRef<Path>, format: RecordFormat) -> Result<Self> {
        Self::open_with_capacity(path, format, DEFAULT_READ_BUFFER)
    }

    pub fn open_with_capacity(
        path: impl AsRef<Path>,
        format: RecordFormat,
        capacity: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MergeError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let reader: Box<dyn BufRead + Send> = if is_gzip(path) {
            Box::new(BufReader::with_capacity(
                capacity,
                MultiGzDecoder::new(BufReader::new(file)),
            ))
        } else {
            Box::new(BufReader::with_capacity(capacity, file))
        };

        debug!(path = %path.display(), "opened input");
        Ok(Self::from_reader(path.display().to_string(), reader, format))
    }
}

impl<R: BufRead> RecordStream<R> {
    pub fn from_reader(name: impl Into<String>, reader: R, format: RecordFormat) -> Self {
        Self {
            name: name.into(),
            reader: Some(reader),
            format,
            line: Vec::new(),
            line_number: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.reader.is_none()
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl<R: BufRead> RecordSource for RecordStream<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_record(&mut self) -> Result<Option<LogRecord>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        // Raw bytes, so a line that is not UTF-8 fails as a located parse error
        self.line.clear();
        let read = reader
            .read_until(b'\n', &mut self.line)
            .map_err(|e| MergeError::io(self.name.clone(), e))?;

        if read == 0 {
            self.reader = None;
            debug!(source = %self.name, lines = self.line_number, "input exhausted");
            return Ok(None);
        }
        self.line_number += 1;

        let text = self.line.strip_suffix(b"\n").unwrap_or(&self.line[..]);
        let text = text.strip_suffix(b"\r").unwrap_or(text);

        match self.format.decode_bytes(text) {
            Ok(record) => Ok(Some(record)),
            Err(DecodeError::Json(source)) => Err(MergeError::Parse {
                source_name: self.name.clone(),
                line: self.line_number,
                source,
            }),
            Err(DecodeError::Schema(reason)) => Err(MergeError::Schema {
                source_name: self.name.clone(),
                line: self.line_number,
                reason,
            }),
        }
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}
