//! HTK master label files: the word sequence handed to `HVite`, and the
//! time-stamped phone/word sequence it writes back.

use crate::alignment::domain::alignment_error::AlignmentEngineError;
use crate::alignment::domain::utterance_aligner::UtteranceAlignment;
use crate::shared::constants::{ENGINE_TIME_OFFSET, SHORT_PAUSE_LABEL};
use crate::shared::time::{round_ms, same_time};
use crate::textgrid::domain::textgrid::Interval;

const MLF_HEADER: &str = "#!MLF!#";
const END_OF_LABELS: &str = ".";

/// HTK times are in units of 100 ns.
const HTK_TIME_UNITS_PER_SECOND: f64 = 1e7;

/// Build the input label file: every word surrounded by optional pauses.
pub fn format_label_file(identifier: &str, labels: &[String]) -> String {
    let mut out = format!("{MLF_HEADER}\n\"*/{identifier}.lab\"\n{SHORT_PAUSE_LABEL}\n");
    for label in labels {
        out.push_str(label);
        out.push('\n');
        out.push_str(SHORT_PAUSE_LABEL);
        out.push('\n');
    }
    out.push_str(END_OF_LABELS);
    out.push('\n');
    out
}

/// Parse `HVite -a -m` output. Each line reads `start end phone [score
/// [word]]`; a fifth field marks the first phone of a word. Zero-length
/// entries are dropped, and each word ends where the next one starts.
pub fn parse_aligned(contents: &str) -> Result<UtteranceAlignment, AlignmentEngineError> {
    let mut phones = Vec::new();
    let mut word_starts: Vec<(String, f64)> = Vec::new();

    for (index, line) in contents.lines().enumerate().skip(2) {
        let line = line.trim();
        if line == END_OF_LABELS {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(AlignmentEngineError::UnparsableOutput(format!(
                "line {}: '{line}'",
                index + 1
            )));
        }
        let start = engine_time(fields[0], index)?;
        let end = engine_time(fields[1], index)?;
        if same_time(start, end) {
            continue;
        }
        phones.push(Interval::new(start, end, fields[2]));
        if fields.len() == 5 {
            word_starts.push((fields[4].to_string(), start));
        }
    }

    let Some(last_end) = phones.last().map(|p| p.end) else {
        return Err(AlignmentEngineError::UnparsableOutput(
            "no aligned phones".to_string(),
        ));
    };

    let words = word_starts
        .iter()
        .enumerate()
        .map(|(k, (word, start))| {
            let end = word_starts.get(k + 1).map_or(last_end, |(_, next)| *next);
            Interval::new(*start, end, word.clone())
        })
        .collect();

    Ok(UtteranceAlignment { phones, words })
}

/// Convert an HTK timestamp to seconds, shifted by half an analysis window.
fn engine_time(raw: &str, index: usize) -> Result<f64, AlignmentEngineError> {
    let ticks: f64 = raw.parse().map_err(|_| {
        AlignmentEngineError::UnparsableOutput(format!("line {}: bad time '{raw}'", index + 1))
    })?;
    let seconds = (ticks / 10.0).round() / (HTK_TIME_UNITS_PER_SECOND / 10.0);
    Ok(round_ms(seconds + ENGINE_TIME_OFFSET))
}
