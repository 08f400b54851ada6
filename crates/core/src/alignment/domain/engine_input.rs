use std::ops::AddAssign;

use crate::dictionary::domain::pronunciation_dictionary::PronunciationDictionary;
use crate::shared::constants::{NOISE_LABEL, UNCLEAR_MARKER};

/// A transcript word paired with the label the engine sees for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignableWord {
    /// Token as transcribed, e.g. `((*AIN'T))`.
    pub original: String,
    /// Dictionary headword, e.g. `AIN'T`.
    pub label: String,
}

/// Word counts reported in the alignment statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordStats {
    pub words: usize,
    pub uncertain: usize,
    pub unclear: usize,
}

impl AddAssign for WordStats {
    fn add_assign(&mut self, other: Self) {
        self.words += other.words;
        self.uncertain += other.uncertain;
        self.unclear += other.unclear;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineInput {
    pub words: Vec<AlignableWord>,
    /// Words left out because the dictionary has no entry for them.
    pub dropped: Vec<String>,
    pub stats: WordStats,
}

impl EngineInput {
    pub fn labels(&self) -> Vec<String> {
        self.words.iter().map(|w| w.label.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Turn tokenized transcript words into engine labels.
///
/// Unclear passages become the noise label, uncertainty parentheses and
/// asterisks are stripped, clue words (`+WORD`) are left out, and so is any
/// word the dictionary cannot pronounce.
pub fn prepare_words(words: &[String], dictionary: &PronunciationDictionary) -> EngineInput {
    let mut input = EngineInput::default();

    for word in words {
        if word.starts_with('+') {
            log::debug!("Clue word '{word}' is not aligned");
            continue;
        }

        let label = if word == UNCLEAR_MARKER {
            input.stats.unclear += 1;
            NOISE_LABEL.to_string()
        } else {
            let inner = match word.strip_prefix("((").and_then(|w| w.strip_suffix("))")) {
                Some(inner) => {
                    input.stats.uncertain += 1;
                    inner
                }
                None => word.as_str(),
            };
            inner.trim_start_matches('*').to_string()
        };

        if label.is_empty() || !dictionary.contains(&label) {
            log::warn!("Word '{word}' not in the pronunciation dictionary, leaving it out");
            input.dropped.push(word.clone());
            continue;
        }

        input.stats.words += 1;
        input.words.push(AlignableWord {
            original: word.clone(),
            label,
        });
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> PronunciationDictionary {
        let mut dict = PronunciationDictionary::new();
        for word in [NOISE_LABEL, "I", "THINK", "AIN'T", "SO"] {
            dict.add(word, vec!["AH0".to_string()]);
        }
        dict
    }

    fn words(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_prepare_words_maps_markup_to_labels() {
        let input = prepare_words(
            &words(&["I", "((THINK))", "((xxxx))", "*AIN'T", "((*SO))"]),
            &dictionary(),
        );
        assert_eq!(input.labels(), vec!["I", "THINK", NOISE_LABEL, "AIN'T", "SO"]);
        assert_eq!(input.words[1].original, "((THINK))");
        assert_eq!(
            input.stats,
            WordStats {
                words: 5,
                uncertain: 2,
                unclear: 1
            }
        );
    }

    #[test]
    fn test_prepare_words_drops_clues_and_unknown_words() {
        let input = prepare_words(&words(&["I", "THI-", "+THINK", "SO"]), &dictionary());
        assert_eq!(input.labels(), vec!["I", "SO"]);
        assert_eq!(input.dropped, vec!["THI-"]);
        assert_eq!(input.stats.words, 2);
    }

    #[test]
    fn test_only_unknown_words_gives_empty_input() {
        let input = prepare_words(&words(&["ZOOM"]), &dictionary());
        assert!(input.is_empty());
    }

    #[test]
    fn test_stats_add_assign() {
        let mut total = WordStats::default();
        total += WordStats {
            words: 3,
            uncertain: 1,
            unclear: 0,
        };
        total += WordStats {
            words: 2,
            uncertain: 0,
            unclear: 1,
        };
        assert_eq!(
            total,
            WordStats {
                words: 5,
                uncertain: 1,
                unclear: 1
            }
        );
    }
}
