pub mod alignment_error;
pub mod engine_input;
pub mod markup_restorer;
pub mod utterance_aligner;
