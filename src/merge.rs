//! Streaming k-way merge of timestamp-ordered record sources
//!
//! The engine keeps exactly one buffered head record per active source
//! (the frontier). Each step writes the earliest head, then pulls the next
//! record from that source only. A source that runs out is removed from
//! the frontier and never polled again.
//!
//! Output order is the total order on `(timestamp, input position)`: when
//! heads share a timestamp the source listed first wins. Removal keeps the
//! relative order of the remaining sources, so "first among the active
//! sources" and "first in the original input list" always agree.

use crate::error::Result;
use crate::merged_writer::MergedLogWriter;
use crate::record_stream::RecordSource;
use crate::schema::LogRecord;
use std::io::Write;
use tracing::{debug, info};

/// Buffered head of one active source
struct Head<S> {
    /// Position of the source in the caller's input list
    input: usize,
    record: LogRecord,
    stream: S,
}

pub struct MergeEngine<S> {
    frontier: Vec<Head<S>>,
}

impl<S: RecordSource> MergeEngine<S> {
    /// Seed the frontier with the first record of every source
    ///
    /// Empty sources are dropped here without error.
    pub fn new(streams: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut frontier = Vec::new();

        for (input, mut stream) in streams.into_iter().enumerate() {
            match stream.next_record()? {
                Some(record) => frontier.push(Head {
                    input,
                    record,
                    stream,
                }),
                None => debug!(source = stream.name(), input, "input is empty"),
            }
        }

        Ok(Self { frontier })
    }

    /// Number of sources that may still produce records
    pub fn active_streams(&self) -> usize {
        self.frontier.len()
    }

    /// Input positions of the active sources, in frontier order
    pub fn active_inputs(&self) -> Vec<usize> {
        self.frontier.iter().map(|head| head.input).collect()
    }

    /// Drain every source into `sink`, returning how many records were written
    ///
    /// On error the sink keeps whatever was written before the failure.
    pub fn run<W: Write>(mut self, sink: &mut MergedLogWriter<W>) -> Result<u64> {
        info!(streams = self.frontier.len(), sink = sink.name(), "merge started");
        let mut written = 0u64;

        while self.frontier.len() > 1 {
            let pos = self.earliest();
            sink.write_record(&self.frontier[pos].record)?;
            written += 1;
            self.advance(pos)?;
        }

        // Nothing left to compare against
        if let Some(Head {
            input,
            record,
            mut stream,
        }) = self.frontier.pop()
        {
            sink.write_record(&record)?;
            written += 1;
            while let Some(record) = stream.next_record()? {
                sink.write_record(&record)?;
                written += 1;
            }
            debug!(source = stream.name(), input, "input drained");
        }

        info!(records = written, "merge finished");
        Ok(written)
    }

    /// Frontier position of the earliest head
    ///
    /// `min_by_key` returns the first of several equal minima, which gives
    /// the tie-break on input position.
    fn earliest(&self) -> usize {
        self.frontier
            .iter()
            .enumerate()
            .min_by_key(|(_, head)| head.record.timestamp())
            .map(|(pos, _)| pos)
            .unwrap_or(0)
    }

    /// Replace the head at `pos` with its source's next record, or retire the source
    fn advance(&mut self, pos: usize) -> Result<()> {
        let head = &mut self.frontier[pos];
        match head.stream.next_record()? {
            Some(next) => head.record = next,
            None => {
                let head = self.frontier.remove(pos);
                debug!(
                    source = head.stream.name(),
                    input = head.input,
                    remaining = self.frontier.len(),
                    "input exhausted"
                );
            }
        }
        Ok(())
    }
}

/// Merge `streams` into `sink` in timestamp order
pub fn merge<S, W>(streams: impl IntoIterator<Item = S>, sink: &mut MergedLogWriter<W>) -> Result<u64>
where
    S: RecordSource,
    W: Write,
{
    MergeEngine::new(streams)?.run(sink)
}
