use std::path::PathBuf;

use thiserror::Error;

/// Failure of one engine invocation. These are reported per annotation unit
/// and never abort the whole run.
#[derive(Error, Debug)]
pub enum AlignmentEngineError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {seconds}s")]
    Timeout { program: String, seconds: u64 },
    #[error("{program} exited with {status}: {detail}")]
    NonZeroExit {
        program: String,
        status: String,
        detail: String,
    },
    #[error("unparsable engine output: {0}")]
    UnparsableOutput(String),
    #[error("scratch file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("aligned word '{found}' does not match transcript word '{expected}'")]
    MarkupMismatch { expected: String, found: String },
}
