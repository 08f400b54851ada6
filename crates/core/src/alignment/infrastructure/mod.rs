pub mod htk_aligner;
pub mod mlf;
pub mod subprocess;
