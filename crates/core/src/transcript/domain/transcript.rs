use std::collections::HashMap;

use super::transcript_error::TranscriptError;
use crate::shared::time::TIME_EPSILON;

/// One annotation unit ("breath group") spoken by a single speaker.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    /// 1-based line number in the transcript file.
    pub line: usize,
    pub speaker_id: String,
    pub speaker_name: String,
    pub start: f64,
    pub end: f64,
    /// Original text as transcribed.
    pub text: String,
    /// Upper-cased tokens with uncertainty markup, see `WordTokenizer`.
    pub words: Vec<String>,
}

impl Utterance {
    /// Label used for tier names: the speaker name, or the id when the
    /// name column was left empty.
    pub fn speaker(&self) -> String {
        let name = self.speaker_name.trim().replace('/', " ");
        if name.is_empty() {
            self.speaker_id.trim().to_string()
        } else {
            name
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A labelled span on the style tier.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleEntry {
    pub line: usize,
    pub start: f64,
    pub end: f64,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    pub utterances: Vec<Utterance>,
    pub style_entries: Vec<StyleEntry>,
}

impl Transcript {
    /// Distinct speaker labels in order of first appearance.
    pub fn speakers(&self) -> Vec<String> {
        let mut speakers: Vec<String> = Vec::new();
        for utterance in &self.utterances {
            let speaker = utterance.speaker();
            if !speakers.contains(&speaker) {
                speakers.push(speaker);
            }
        }
        speakers
    }

    pub fn word_count(&self) -> usize {
        self.utterances.iter().map(|u| u.words.len()).sum()
    }

    /// Check that every unit has a positive extent and that no speaker
    /// talks in two overlapping units.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        for utterance in &self.utterances {
            if utterance.end <= utterance.start {
                return Err(TranscriptError::EmptyInterval {
                    line: utterance.line,
                    start: utterance.start,
                    end: utterance.end,
                });
            }
        }
        for entry in &self.style_entries {
            if entry.end <= entry.start {
                return Err(TranscriptError::EmptyInterval {
                    line: entry.line,
                    start: entry.start,
                    end: entry.end,
                });
            }
        }

        let mut by_speaker: HashMap<String, Vec<&Utterance>> = HashMap::new();
        for utterance in &self.utterances {
            by_speaker
                .entry(utterance.speaker())
                .or_default()
                .push(utterance);
        }

        for (speaker, mut utterances) in by_speaker {
            utterances.sort_by(|a, b| a.start.total_cmp(&b.start));
            for pair in utterances.windows(2) {
                if pair[1].start < pair[0].end - TIME_EPSILON {
                    let (first, second) = if pair[0].line < pair[1].line {
                        (pair[0].line, pair[1].line)
                    } else {
                        (pair[1].line, pair[0].line)
                    };
                    return Err(TranscriptError::OverlappingUtterances {
                        speaker,
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }
}
