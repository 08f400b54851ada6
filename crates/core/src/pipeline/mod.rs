pub mod align_error;
pub mod aligner;
pub mod alignment_executor;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod prompt;
pub mod run_report;
