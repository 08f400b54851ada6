pub mod transcript;
pub mod transcript_error;
pub mod transcript_reader;
pub mod word_tokenizer;
