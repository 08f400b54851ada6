use once_cell::sync::Lazy;
use regex::Regex;

use super::transcript_error::TranscriptError;
use crate::shared::constants::UNCLEAR_MARKER;

static START_UNCERTAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\(").unwrap());
static END_UNCERTAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)\)").unwrap());
static INITIAL_APOSTROPHE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\s|^)'\b").unwrap());
static CLUSTER_CODING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d\w(\w)?").unwrap());
static UNCLEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\(\s*\)\)").unwrap());
static HYPHENATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)-(\w+)").unwrap());

const PUNCTUATION: &[&str] = &[",", ".", ":", ";", "!", "?", "\"", "%", "--"];

/// Splits transcribed text into dictionary-ready tokens.
///
/// Uncertain spans are delimited by `((` and `))` and may run across
/// several lines, so the tokenizer keeps the line on which the open span
/// started. Words inside a span come out individually wrapped, e.g.
/// `((HELLO))`.
#[derive(Debug, Default)]
pub struct WordTokenizer {
    uncertain_since: Option<usize>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line on which a still-open uncertain span began, if any.
    pub fn open_span(&self) -> Option<usize> {
        self.uncertain_since
    }

    pub fn tokenize(&mut self, line: usize, text: &str) -> Result<Vec<String>, TranscriptError> {
        let normalized = normalize(text);
        let mut words = Vec::new();

        for token in normalized.split_whitespace() {
            match token {
                "((" => {
                    if let Some(opened_at) = self.uncertain_since {
                        return Err(TranscriptError::UnclosedUncertain { line, opened_at });
                    }
                    self.uncertain_since = Some(line);
                }
                "))" => {
                    if self.uncertain_since.take().is_none() {
                        return Err(TranscriptError::UnopenedUncertain { line });
                    }
                }
                _ if self.uncertain_since.is_some() && token != UNCLEAR_MARKER => {
                    words.push(format!("(({token}))"));
                }
                _ => words.push(token.to_string()),
            }
        }

        log::debug!("line {line}: {words:?}");
        Ok(words)
    }
}

fn normalize(text: &str) -> String {
    let mut line = text.trim().to_uppercase();

    // one word, so that /ay/ in "high school" is treated like a single item
    line = line.replace("HIGH SCHOOL", "HIGHSCHOOL");

    line = START_UNCERTAIN.replace_all(&line, " (( ").into_owned();
    line = END_UNCERTAIN.replace_all(&line, " )) ").into_owned();
    line = line.replace(" - ", " -- ");
    for mark in PUNCTUATION {
        line = line.replace(mark, " ");
    }
    line = INITIAL_APOSTROPHE.replace_all(&line, " ").into_owned();
    line = CLUSTER_CODING.replace_all(&line, " ").into_owned();
    line = UNCLEAR.replace_all(&line, UNCLEAR_MARKER).into_owned();
    line = line.replace(" - ", "");

    // twice, for words like "daughter-in-law"
    line = HYPHENATED.replace_all(&line, "${1} ${2}").into_owned();
    line = HYPHENATED.replace_all(&line, "${1} ${2}").into_owned();
    line
}
