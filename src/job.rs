//! File-to-file merge runs
//!
//! A job validates everything up front, opens every input, and only then
//! creates the destination. In atomic mode the merge goes to a temporary
//! file beside the destination, which is renamed into place on success and
//! discarded on failure.

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::merge::merge;
use crate::merged_writer::MergedLogWriter;
use crate::preflight;
use crate::record_stream::FileRecordStream;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeJob {
    /// Inputs in tie-break priority order
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    /// Replace an existing destination
    pub force: bool,
    /// Only create the destination once the merge has succeeded
    pub atomic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub inputs: usize,
    pub records: u64,
}

impl MergeJob {
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            output: output.into(),
            force: false,
            atomic: false,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn preflight(&self) -> Result<()> {
        preflight::check(&self.inputs, &self.output, self.force)
    }

    pub fn run(&self, config: &MergeConfig) -> Result<MergeSummary> {
        config.validate()?;
        self.preflight()?;

        let format = config.record_format();
        let streams = self
            .inputs
            .iter()
            .map(|path| {
                FileRecordStream::open_with_capacity(path, format.clone(), config.read_buffer_bytes)
            })
            .collect::<Result<Vec<_>>>()?;

        let records = if self.atomic {
            self.merge_atomic(streams, config)?
        } else {
            self.merge_direct(streams, config)?
        };

        info!(
            inputs = self.inputs.len(),
            records,
            output = %self.output.display(),
            "merged logs"
        );
        Ok(MergeSummary {
            inputs: self.inputs.len(),
            records,
        })
    }

    fn merge_direct(&self, streams: Vec<FileRecordStream>, config: &MergeConfig) -> Result<u64> {
        // Without --force a destination that appeared after preflight is left alone
        let mut sink = if self.force {
            preflight::remove_existing(&self.output)?;
            MergedLogWriter::create_or_truncate(&self.output, config.write_buffer_bytes)?
        } else {
            MergedLogWriter::create(&self.output, config.write_buffer_bytes)?
        };
        let records = merge(streams, &mut sink)?;
        sink.finish()?;
        Ok(records)
    }

    fn merge_atomic(&self, streams: Vec<FileRecordStream>, config: &MergeConfig) -> Result<u64> {
        let output_name = self.output.display().to_string();
        let dir = preflight::destination_dir(&self.output);

        // Dropping the temp file on any error path deletes it
        let mut sink = MergedLogWriter::temp_in(dir, config.write_buffer_bytes)?;
        let records = merge(streams, &mut sink)?;
        let temp = sink.finish()?;
        temp.as_file()
            .sync_all()
            .map_err(|e| MergeError::io(output_name.clone(), e))?;

        let persisted = if self.force {
            temp.persist(&self.output)
        } else {
            temp.persist_noclobber(&self.output)
        };
        persisted.map_err(|e| MergeError::io(output_name, e.error))?;

        Ok(records)
    }
}
