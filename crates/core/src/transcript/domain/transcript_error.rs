use std::path::PathBuf;

use thiserror::Error;

/// Problems found while parsing or checking a transcript. All of them abort
/// the run before the alignment engine is invoked.
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected 5 tab-separated fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: invalid {field} time '{value}'")]
    InvalidTime {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: end {end:.3}s is not after beginning {start:.3}s")]
    EmptyInterval { line: usize, start: f64, end: f64 },
    #[error(
        "line {line}: uncertain transcription opened twice in a row; close the double parenthesis opened on line {opened_at}"
    )]
    UnclosedUncertain { line: usize, opened_at: usize },
    #[error("line {line}: closing double parenthesis without an opening one")]
    UnopenedUncertain { line: usize },
    #[error("speaker '{speaker}': utterances on lines {first} and {second} overlap")]
    OverlappingUtterances {
        speaker: String,
        first: usize,
        second: usize,
    },
}
