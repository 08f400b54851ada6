use std::collections::BTreeSet;

use super::pronunciation_dictionary::PronunciationDictionary;
use crate::shared::constants::{STYLE_CODES, UNCLEAR_MARKER};
use crate::transcript::domain::transcript::Transcript;

/// Whether the check runs ahead of an alignment or on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// A word followed by a known clue word (`+WORD`) is accepted.
    Align,
    /// Every word missing from the dictionary is reported, with its clue.
    CheckOnly,
}

/// A transcript word without a dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryMiss {
    /// Word with uncertainty markup and asterisks removed.
    pub word: String,
    /// Intended word given by the transcriber after a truncation.
    pub clue: Option<String>,
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionaryCheck {
    pub missing: BTreeSet<String>,
    pub misses: Vec<DictionaryMiss>,
}

impl DictionaryCheck {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }
}

pub struct DictionaryChecker {
    mode: CheckMode,
    verbose: bool,
}

impl DictionaryChecker {
    pub fn new(mode: CheckMode, verbose: bool) -> Self {
        Self { mode, verbose }
    }

    /// Look up every word token of `transcript`. Neither input is modified.
    pub fn check(
        &self,
        transcript: &Transcript,
        dictionary: &PronunciationDictionary,
    ) -> DictionaryCheck {
        let mut result = DictionaryCheck::default();

        for utterance in &transcript.utterances {
            let words = &utterance.words;
            for (i, word) in words.iter().enumerate() {
                let next = words.get(i + 1).map(String::as_str);
                let Some(bare) = self.unknown_word(word, next, dictionary) else {
                    continue;
                };

                let clue = next.and_then(clue_word).map(str::to_string);
                if self.verbose {
                    log::info!(
                        "Unknown word '{bare}' on line {}: {}",
                        utterance.line,
                        utterance.text
                    );
                } else {
                    log::debug!("Unknown word '{bare}' on line {}", utterance.line);
                }
                result.missing.insert(bare.clone());
                result.misses.push(DictionaryMiss {
                    word: bare,
                    clue,
                    line: utterance.line,
                    text: utterance.text.clone(),
                });
            }
        }

        if !result.is_ok() {
            log::warn!(
                "{} word(s) not found in the pronunciation dictionary",
                result.missing.len()
            );
        }
        result
    }

    /// The bare form of `word` if it needs a dictionary entry and has none.
    fn unknown_word(
        &self,
        word: &str,
        next: Option<&str>,
        dictionary: &PronunciationDictionary,
    ) -> Option<String> {
        if word == UNCLEAR_MARKER || word.contains('+') || STYLE_CODES.contains(&word) {
            return None;
        }
        let bare = strip_markup(word);
        if bare.is_empty() || dictionary.contains(bare) {
            return None;
        }
        if self.mode == CheckMode::Align {
            if let Some(clue) = next.and_then(clue_word) {
                if dictionary.contains(clue) {
                    log::debug!("'{bare}' accepted through clue '+{clue}'");
                    return None;
                }
            }
        }
        Some(bare.to_string())
    }
}

/// Strip uncertainty parentheses and a leading asterisk: `((*AIN'T))` is
/// looked up as `AIN'T`.
pub fn strip_markup(word: &str) -> &str {
    let inner = word
        .strip_prefix("((")
        .and_then(|w| w.strip_suffix("))"))
        .unwrap_or(word);
    inner.trim_start_matches('*')
}

/// `+WORD` tokens name the intended form of a preceding truncated word.
fn clue_word(token: &str) -> Option<&str> {
    let clue = token.strip_prefix('+')?;
    if clue.is_empty() {
        None
    } else {
        Some(clue)
    }
}
