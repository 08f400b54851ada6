use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write '{word}' to {path}: not representable in Latin-1")]
    NotLatin1 { path: PathBuf, word: String },
    #[error("{path}, line {line}: expected WORD<TAB>PHONES, found '{text}'")]
    MalformedEntry {
        path: PathBuf,
        line: usize,
        text: String,
    },
    #[error("transcription '{transcription}' has no spaces between phones")]
    MissingSpaces { transcription: String },
    #[error("unknown stress '{stress}' on vowel {phone} in '{transcription}'")]
    UnknownStress {
        stress: char,
        phone: String,
        transcription: String,
    },
    #[error("vowel {vowel} at position {position} in '{transcription}' has no stress digit")]
    MissingStress {
        vowel: String,
        position: usize,
        transcription: String,
    },
    #[error("unknown phone {phone} at position {position} in '{transcription}'")]
    UnknownPhone {
        phone: String,
        position: usize,
        transcription: String,
    },
    #[error("{} word(s) not in the pronunciation dictionary: {}", .words.len(), .words.join(", "))]
    UnknownWords { words: Vec<String> },
}
