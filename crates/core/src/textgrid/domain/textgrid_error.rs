use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextGridError {
    #[error("recording duration is {duration:.3}s; cannot build tiers over an empty time range")]
    ZeroDuration { duration: f64 },
    #[error("tier '{tier}': interval {start:.3}-{end:.3} has no positive extent")]
    EmptyInterval { tier: String, start: f64, end: f64 },
    #[error("tier '{tier}': intervals are not contiguous at {at:.3}s")]
    NotContiguous { tier: String, at: f64 },
    #[error("tier '{tier}' spans {start:.3}-{end:.3}, expected {expected_start:.3}-{expected_end:.3}")]
    Coverage {
        tier: String,
        start: f64,
        end: f64,
        expected_start: f64,
        expected_end: f64,
    },
    #[error("output file {path} already exists (use force to overwrite)")]
    OutputExists { path: PathBuf },
    #[error("failed to read TextGrid {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write TextGrid {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed TextGrid: {0}")]
    Parse(String),
    #[error("unsupported tier class '{0}'")]
    UnsupportedTier(String),
}
