use std::path::PathBuf;

use thiserror::Error;

use crate::audio::domain::audio_error::AudioError;
use crate::dictionary::domain::dictionary_error::DictionaryError;
use crate::shared::config::ConfigError;
use crate::textgrid::domain::textgrid_error::TextGridError;
use crate::transcript::domain::transcript_error::TranscriptError;

/// Anything that stops a whole run. Failures of single utterances are
/// collected in the run summary instead.
#[derive(Error, Debug)]
pub enum AlignError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    TextGrid(#[from] TextGridError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
    #[error("failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("alignment stopped after {failed} failed utterance(s)")]
    Aborted { failed: usize },
}
