use super::alignment_error::AlignmentEngineError;
use super::engine_input::AlignableWord;
use crate::shared::constants::{SHORT_PAUSE_LABEL, SILENCE_LABEL};
use crate::textgrid::domain::textgrid::Interval;

/// `sp` or `sil`, in any case.
pub fn is_pause(label: &str) -> bool {
    label.eq_ignore_ascii_case(SHORT_PAUSE_LABEL) || label.eq_ignore_ascii_case(SILENCE_LABEL)
}

/// Put the transcriber's markup back on the aligned word tier.
///
/// Pause intervals are kept as they are; every other interval must carry
/// the label of the next expected word, and is relabelled with that word's
/// original token (`THINK` becomes `((THINK))` again).
pub fn restore_markup(
    aligned: &[Interval],
    expected: &[AlignableWord],
) -> Result<Vec<Interval>, AlignmentEngineError> {
    let mut remaining = expected.iter();
    let mut restored = Vec::with_capacity(aligned.len());

    for interval in aligned {
        if is_pause(&interval.label) {
            restored.push(interval.clone());
            continue;
        }
        let Some(word) = remaining.next() else {
            return Err(AlignmentEngineError::MarkupMismatch {
                expected: String::new(),
                found: interval.label.clone(),
            });
        };
        if word.label != interval.label {
            return Err(AlignmentEngineError::MarkupMismatch {
                expected: word.label.clone(),
                found: interval.label.clone(),
            });
        }
        restored.push(Interval {
            label: word.original.clone(),
            ..interval.clone()
        });
    }

    if let Some(word) = remaining.next() {
        return Err(AlignmentEngineError::MarkupMismatch {
            expected: word.label.clone(),
            found: String::new(),
        });
    }
    Ok(restored)
}
