//! merge-logs - merge chronologically ordered JSONL logs
//!
//! Each input must already be ordered by its `timestamp` field
//! (`YYYY-MM-DD HH:MM:SS`). The inputs are read one record at a time and
//! interleaved into a single ordered output; when two records share a
//! timestamp, the one from the input listed first is written first.
//!
//! ## Usage
//!
//! ```bash
//! merge-logs app.jsonl worker.jsonl -o merged.jsonl
//! # replace an existing output, only once the merge has succeeded
//! merge-logs app.jsonl worker.jsonl.gz -o merged.jsonl --force --atomic
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG` or pass `-v` for more detail.

use anyhow::{Context, Result};
use clap::Parser;
use log_merger::{MergeConfig, MergeJob};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "merge-logs")]
#[command(about = "Merge timestamp-ordered JSONL logs into one file", long_about = None)]
struct Cli {
    /// Paths to logs to merge; earlier paths win timestamp ties
    #[arg(value_name = "PATH TO LOG")]
    inputs: Vec<PathBuf>,

    /// Path to merged log
    #[arg(short, long, value_name = "PATH TO MERGED LOG")]
    output: PathBuf,

    /// Replace the merged log if it already exists
    #[arg(short, long)]
    force: bool,

    /// Write to a temporary file and rename it over the merged log on success
    #[arg(long)]
    atomic: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the timestamp field (overrides config)
    #[arg(long)]
    timestamp_field: Option<String>,

    /// chrono format of the timestamp field (overrides config)
    #[arg(long)]
    timestamp_format: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn merge_config(&self) -> Result<MergeConfig> {
        let mut config = MergeConfig::load(self.config.as_deref())?;

        if let Some(field) = &self.timestamp_field {
            config.timestamp_field = field.clone();
        }
        if let Some(format) = &self.timestamp_format {
            config.timestamp_format = format.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.merge_config().context("Failed to load configuration")?;

    let job = MergeJob::new(cli.inputs, cli.output)
        .force(cli.force)
        .atomic(cli.atomic);

    let summary = job
        .run(&config)
        .with_context(|| format!("Failed to merge logs into {}", job.output.display()))
        .inspect_err(|e| tracing::error!("{:#}", e))?;

    println!(
        "merged {} records into {}",
        summary.records,
        job.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_two_inputs() {
        let cli = Cli::try_parse_from(["merge-logs", "a.jsonl", "b.jsonl", "-o", "out.jsonl", "-f"])
            .unwrap();
        assert_eq!(cli.inputs, vec![PathBuf::from("a.jsonl"), PathBuf::from("b.jsonl")]);
        assert_eq!(cli.output, PathBuf::from("out.jsonl"));
        assert!(cli.force);
        assert!(!cli.atomic);
    }

    #[test]
    fn test_any_number_of_inputs() {
        let cli = Cli::try_parse_from(["merge-logs", "--output", "out.jsonl"]).unwrap();
        assert!(cli.inputs.is_empty());

        let cli = Cli::try_parse_from(["merge-logs", "a", "b", "c", "d", "-o", "out"]).unwrap();
        assert_eq!(cli.inputs.len(), 4);
    }

    #[test]
    fn test_output_is_required() {
        assert!(Cli::try_parse_from(["merge-logs", "a.jsonl", "b.jsonl"]).is_err());
    }

    #[test]
    fn test_cli_overrides_timestamp_settings() {
        let cli = Cli::try_parse_from([
            "merge-logs",
            "-o",
            "out",
            "--timestamp-field",
            "time",
            "--timestamp-format",
            "%d/%m/%Y %H:%M:%S",
        ])
        .unwrap();

        let config = cli.merge_config().unwrap();
        assert_eq!(config.timestamp_field, "time");
        assert_eq!(config.timestamp_format, "%d/%m/%Y %H:%M:%S");
    }
}
