use std::fs;
use std::path::Path;

use crate::shared::constants::STYLE_MARKERS;
use crate::shared::time::round_ms;
use crate::transcript::domain::transcript::{StyleEntry, Transcript, Utterance};
use crate::transcript::domain::transcript_error::TranscriptError;
use crate::transcript::domain::transcript_reader::TranscriptReader;
use crate::transcript::domain::word_tokenizer::WordTokenizer;

const FIELD_COUNT: usize = 5;

/// Reads tab-delimited transcripts: speaker id, speaker name, beginning,
/// end and text, one annotation unit per line.
pub struct TabTranscriptReader;

impl TabTranscriptReader {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, contents: &str) -> Result<Transcript, TranscriptError> {
        let mut transcript = Transcript::default();
        let mut tokenizer = WordTokenizer::new();
        let mut seen_data = false;

        for (index, raw) in contents.lines().enumerate() {
            let line = index + 1;
            let cleaned = replace_smart_quotes(raw);
            let Some(fields) = split_fields(line, &cleaned)? else {
                continue;
            };

            let first_data_line = !seen_data;
            seen_data = true;
            if first_data_line && is_header(&fields) {
                log::debug!("Skipping header row on line {line}");
                continue;
            }

            let start = parse_time(line, "beginning", fields[2])?;
            let end = parse_time(line, "end", fields[3])?;

            if is_style_line(&fields) {
                transcript.style_entries.push(StyleEntry {
                    line,
                    start,
                    end,
                    label: fields[4].trim().to_uppercase(),
                });
                continue;
            }

            let words = tokenizer.tokenize(line, fields[4])?;
            transcript.utterances.push(Utterance {
                line,
                speaker_id: fields[0].trim().to_string(),
                speaker_name: fields[1].trim().to_string(),
                start,
                end,
                text: fields[4].trim().to_string(),
                words,
            });
        }

        if let Some(opened_at) = tokenizer.open_span() {
            log::warn!("Uncertain transcription opened on line {opened_at} is never closed");
        }

        log::info!(
            "Read {} annotation units and {} style entries",
            transcript.utterances.len(),
            transcript.style_entries.len()
        );
        Ok(transcript)
    }
}

impl Default for TabTranscriptReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptReader for TabTranscriptReader {
    fn read(&self, path: &Path) -> Result<Transcript, TranscriptError> {
        log::info!("Reading transcript {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| TranscriptError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse(&contents)
    }
}

/// Replace typographic quotes with their ASCII equivalents, so that words
/// typed with them still match dictionary entries.
pub fn replace_smart_quotes(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}' => '\'',
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' => '"',
            other => other,
        })
        .collect()
}

/// Split a line into its five fields. Blank lines yield `None`.
fn split_fields(line: usize, text: &str) -> Result<Option<Vec<&str>>, TranscriptError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = text.trim_end().split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(TranscriptError::FieldCount {
            line,
            found: fields.len(),
        });
    }
    Ok(Some(fields))
}

fn is_header(fields: &[&str]) -> bool {
    fields[2].trim().parse::<f64>().is_err() && fields[3].trim().parse::<f64>().is_err()
}

fn is_style_line(fields: &[&str]) -> bool {
    STYLE_MARKERS.contains(&fields[0].trim()) || STYLE_MARKERS.contains(&fields[1].trim())
}

fn parse_time(line: usize, field: &'static str, value: &str) -> Result<f64, TranscriptError> {
    match value.trim().parse::<f64>() {
        Ok(t) if t.is_finite() && t >= 0.0 => Ok(round_ms(t)),
        _ => Err(TranscriptError::InvalidTime {
            line,
            field,
            value: value.to_string(),
        }),
    }
}
