use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("cannot read audio file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("{program} failed to measure {path}: {reason}")]
    Probe {
        program: String,
        path: PathBuf,
        reason: String,
    },
    #[error("no duration in probe output: '{0}'")]
    UnparsableDuration(String),
}
