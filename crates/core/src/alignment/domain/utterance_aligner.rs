use std::path::PathBuf;

use super::alignment_error::AlignmentEngineError;
use crate::textgrid::domain::textgrid::Interval;

/// Everything the engine needs to align one annotation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRequest {
    /// Unique per run; used to name scratch files.
    pub identifier: String,
    pub audio: PathBuf,
    /// Window inside the recording, in seconds.
    pub start: f64,
    pub duration: f64,
    /// Engine labels, in transcript order.
    pub words: Vec<String>,
    pub dictionary: PathBuf,
    /// Directory owned by this request for the duration of the call.
    pub scratch_dir: PathBuf,
}

/// Engine output, with times relative to the start of the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtteranceAlignment {
    pub phones: Vec<Interval>,
    pub words: Vec<Interval>,
}

/// Capability to align one utterance: audio window + words + dictionary
/// in, phone and word intervals out.
///
/// Implementations must be callable from several worker threads at once.
pub trait UtteranceAligner: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    fn align(&self, request: &AlignmentRequest)
        -> Result<UtteranceAlignment, AlignmentEngineError>;
}
