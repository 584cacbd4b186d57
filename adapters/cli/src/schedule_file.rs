//! Loading of wave-schedule TOML files from disk.

use std::path::Path;

use pantheon_siege_core::schedule::WaveSchedule;
use thiserror::Error;

/// Failures that can occur while loading a schedule file.
#[derive(Debug, Error)]
pub(crate) enum ScheduleFileError {
    /// The file could not be read.
    #[error("failed to read schedule file: {0}")]
    Io(#[from] std::io::Error),
    /// The file contents are not a valid schedule document.
    #[error("failed to parse schedule toml: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Reads and parses the schedule at the provided path.
pub(crate) fn load(path: &Path) -> Result<WaveSchedule, ScheduleFileError> {
    let contents = std::fs::read_to_string(path)?;
    let schedule = toml::from_str(&contents)?;
    Ok(schedule)
}
