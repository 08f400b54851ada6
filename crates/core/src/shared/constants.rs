/// Speaker id / name values that mark a line as a style-tier entry.
pub const STYLE_MARKERS: &[&str] = &["style", "Style", "STYLE"];

/// Name of the tier built from style entries.
pub const STYLE_TIER_NAME: &str = "style";

/// Style codes that may appear as words and are never dictionary misses.
pub const STYLE_CODES: &[&str] = &["R", "N", "L", "G", "S", "K", "T", "C", "WL", "MP", "SD", "RP"];

/// Annotation units shorter than this (seconds) cannot be aligned.
pub const MIN_UTTERANCE_DURATION: f64 = 0.05;

/// Token produced for empty double parentheses.
pub const UNCLEAR_MARKER: &str = "((xxxx))";

/// Engine label that stands in for an unclear passage.
pub const NOISE_LABEL: &str = "{NS}";

/// Engine label for inter-word short pauses.
pub const SHORT_PAUSE_LABEL: &str = "sp";

/// Engine label for leading and trailing silence.
pub const SILENCE_LABEL: &str = "sil";

/// Sample rate the acoustic models are trained on.
pub const MODEL_SAMPLE_RATE: u32 = 16000;

/// Shift applied to engine timestamps (half a 25 ms analysis window).
pub const ENGINE_TIME_OFFSET: f64 = 0.0125;

/// Default per-subprocess timeout in seconds.
pub const DEFAULT_UTTERANCE_TIMEOUT_SECS: u64 = 120;

pub const PHONE_TIER_SUFFIX: &str = "phone";
pub const WORD_TIER_SUFFIX: &str = "word";

pub const TEXTGRID_EXTENSION: &str = "TextGrid";
pub const TRANSCRIPT_EXTENSION: &str = "txt";
pub const ERROR_LOG_EXTENSION: &str = "errorlog";
pub const STATS_LOG_SUFFIX: &str = "alignment.log";

pub const DURATION_SCRIPT_NAME: &str = "get_duration.praat";
pub const APP_DIR_NAME: &str = "forced-align";
pub const DICTIONARY_FILE_NAME: &str = "dict";
