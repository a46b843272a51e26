//! Append-only sink for merged records
//!
//! Records are written as their original line text followed by a single
//! `\n`. When the destination is a file, it is held under an exclusive
//! lock for the lifetime of the writer so no other process can interleave
//! lines into it.

use crate::error::{MergeError, Result};
use crate::schema::LogRecord;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub struct MergedLogWriter<W: Write> {
    name: String,
    writer: BufWriter<W>,
    records_written: u64,
}

impl MergedLogWriter<File> {
    /// Create `path`, failing if it already exists, and lock it for writing
    pub fn create(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        Self::open_locked(path.as_ref(), OpenOptions::new().write(true).create_new(true), capacity)
    }

    /// Create or truncate `path` and lock it for writing
    pub fn create_or_truncate(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        Self::open_locked(
            path.as_ref(),
            OpenOptions::new().write(true).create(true).truncate(true),
            capacity,
        )
    }

    fn open_locked(path: &Path, options: &OpenOptions, capacity: usize) -> Result<Self> {
        let name = path.display().to_string();
        let file = options
            .open(path)
            .map_err(|e| MergeError::io(name.clone(), e))?;

        file.lock_exclusive()
            .map_err(|e| MergeError::io(name.clone(), e))?;

        Ok(Self::with_capacity(name, file, capacity))
    }
}

impl MergedLogWriter<NamedTempFile> {
    /// Write into a fresh temporary file in `dir`, locked like [`MergedLogWriter::create`]
    pub fn temp_in(dir: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let dir = dir.as_ref();
        let temp = NamedTempFile::new_in(dir)
            .map_err(|e| MergeError::io(dir.display().to_string(), e))?;
        let name = temp.path().display().to_string();

        temp.as_file()
            .lock_exclusive()
            .map_err(|e| MergeError::io(name.clone(), e))?;

        Ok(Self::with_capacity(name, temp, capacity))
    }
}

impl<W: Write> MergedLogWriter<W> {
    pub fn new(name: impl Into<String>, inner: W) -> Self {
        Self::with_capacity(name, inner, 8192)
    }

    pub fn with_capacity(name: impl Into<String>, inner: W, capacity: usize) -> Self {
        Self {
            name: name.into(),
            writer: BufWriter::with_capacity(capacity, inner),
            records_written: 0,
        }
    }

    /// Append one record and its terminator
    pub fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.writer
            .write_all(record.as_line().as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| MergeError::io(self.name.clone(), e))?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flush and hand back the underlying writer
    ///
    /// Consumes the sink, so it can only be closed once.
    pub fn finish(self) -> Result<W> {
        let name = self.name;
        self.writer
            .into_inner()
            .map_err(|e| MergeError::io(name, e.into_error()))
    }
}
