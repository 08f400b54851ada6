pub mod audio_error;
pub mod duration_probe;
