//! Checks that run before any input is opened or any output is touched

use crate::error::{MergeError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Every input must be an existing, readable regular file
pub fn check_inputs(inputs: &[PathBuf]) -> Result<()> {
    for input in inputs {
        if !input.exists() {
            return Err(MergeError::Config(format!(
                "input file \"{}\" does not exist",
                input.display()
            )));
        }
        if !input.is_file() {
            return Err(MergeError::Config(format!(
                "input \"{}\" is not a regular file",
                input.display()
            )));
        }
        File::open(input).map_err(|e| {
            MergeError::Config(format!("input file \"{}\" is not readable: {}", input.display(), e))
        })?;
    }
    Ok(())
}

/// The destination may only exist when `force` is set, and never as a directory
pub fn check_destination(output: &Path, force: bool) -> Result<()> {
    if output.is_dir() {
        return Err(MergeError::Config(format!(
            "destination \"{}\" is a directory",
            output.display()
        )));
    }

    if output.exists() && !force {
        return Err(MergeError::Config(format!(
            "file \"{}\" already exists; remove it first, choose another path or pass --force",
            output.display()
        )));
    }

    let parent = destination_dir(output);
    if !parent.is_dir() {
        return Err(MergeError::Config(format!(
            "directory \"{}\" for the destination does not exist",
            parent.display()
        )));
    }

    Ok(())
}

/// The destination must not be one of the inputs; `--force` would delete it
pub fn check_distinct(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let Ok(output) = fs::canonicalize(output) else {
        // Does not exist yet, so it cannot be an input
        return Ok(());
    };

    for input in inputs {
        if fs::canonicalize(input).is_ok_and(|input| input == output) {
            return Err(MergeError::Config(format!(
                "destination \"{}\" is also an input",
                output.display()
            )));
        }
    }
    Ok(())
}

/// Run every check, inputs first
pub fn check(inputs: &[PathBuf], output: &Path, force: bool) -> Result<()> {
    check_inputs(inputs)?;
    check_destination(output, force)?;
    check_distinct(inputs, output)
}

/// Delete an existing destination so it can be recreated
///
/// Only call after [`check`] has passed.
pub fn remove_existing(output: &Path) -> Result<()> {
    if output.exists() {
        warn!(path = %output.display(), "removing existing destination");
        fs::remove_file(output).map_err(|e| MergeError::io(output.display().to_string(), e))?;
    }
    Ok(())
}

/// Directory the destination lives in
pub fn destination_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
