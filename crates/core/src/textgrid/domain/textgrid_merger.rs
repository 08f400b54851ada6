use super::textgrid::{Interval, IntervalTier, Overlap, TextGrid};
use super::textgrid_error::TextGridError;
use crate::shared::config::OutputMode;
use crate::shared::constants::{PHONE_TIER_SUFFIX, STYLE_TIER_NAME, WORD_TIER_SUFFIX};
use crate::transcript::domain::transcript::StyleEntry;

/// Phone and word intervals for one annotation unit, relative to its start.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedUtterance {
    pub speaker: String,
    /// Position of the unit in the recording, in seconds.
    pub start: f64,
    pub phones: Vec<Interval>,
    pub words: Vec<Interval>,
}

/// One output grid. `speaker` is set in per-speaker mode.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedGrid {
    pub speaker: Option<String>,
    pub grid: TextGrid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub grids: Vec<MergedGrid>,
    pub overlaps: Vec<Overlap>,
}

pub fn phone_tier_name(speaker: &str) -> String {
    format!("{speaker} - {PHONE_TIER_SUFFIX}")
}

pub fn word_tier_name(speaker: &str) -> String {
    format!("{speaker} - {WORD_TIER_SUFFIX}")
}

/// Assembles per-utterance alignments and the style tier into output grids.
pub struct TextGridMerger {
    mode: OutputMode,
}

impl TextGridMerger {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Add one utterance's phone and word tiers to `grid`, shifted to the
    /// utterance position. Tiers are created per speaker on first use.
    pub fn merge_textgrids(grid: &mut TextGrid, utterance: &AlignedUtterance) {
        let tiers = [
            (phone_tier_name(&utterance.speaker), &utterance.phones),
            (word_tier_name(&utterance.speaker), &utterance.words),
        ];
        for (name, intervals) in tiers {
            let mut shifted = IntervalTier::new(name.clone());
            for interval in intervals {
                shifted.push(interval.shifted(utterance.start));
            }
            match grid.tier_mut(&name) {
                Some(existing) => existing.append(&shifted),
                None => grid.push_tier(shifted),
            }
        }
        grid.end = grid
            .tiers()
            .iter()
            .map(|t| t.end)
            .fold(grid.end, f64::max);
        log::debug!(
            "Merged unit at {:.3}s for speaker '{}'",
            utterance.start,
            utterance.speaker
        );
    }

    /// Build the style tier from the transcript's style entries.
    pub fn process_style_tier(entries: &[StyleEntry]) -> Option<IntervalTier> {
        if entries.is_empty() {
            return None;
        }
        let mut tier = IntervalTier::new(STYLE_TIER_NAME);
        for entry in entries {
            tier.push(Interval::new(entry.start, entry.end, entry.label.clone()));
        }
        log::debug!("Style tier with {} entries", tier.len());
        Some(tier)
    }

    /// Merge all utterances in order and produce grids spanning
    /// `[0, duration]`, with the style tier added last.
    pub fn merge(
        &self,
        utterances: &[AlignedUtterance],
        style: Option<&IntervalTier>,
        duration: f64,
    ) -> Result<MergeResult, TextGridError> {
        if duration <= 0.0 {
            return Err(TextGridError::ZeroDuration { duration });
        }

        let mut grids = match self.mode {
            OutputMode::Combined => {
                let mut grid = TextGrid::new();
                for utterance in utterances {
                    Self::merge_textgrids(&mut grid, utterance);
                }
                vec![MergedGrid {
                    speaker: None,
                    grid,
                }]
            }
            OutputMode::PerSpeaker => {
                let mut grids: Vec<MergedGrid> = Vec::new();
                for utterance in utterances {
                    let index = match grids
                        .iter()
                        .position(|g| g.speaker.as_deref() == Some(utterance.speaker.as_str()))
                    {
                        Some(index) => index,
                        None => {
                            grids.push(MergedGrid {
                                speaker: Some(utterance.speaker.clone()),
                                grid: TextGrid::new(),
                            });
                            grids.len() - 1
                        }
                    };
                    Self::merge_textgrids(&mut grids[index].grid, utterance);
                }
                grids
            }
        };

        let mut overlaps = Vec::new();
        for merged in &mut grids {
            if let Some(style) = style {
                merged.grid.push_tier(style.clone());
            }
            overlaps.extend(merged.grid.tidy_up(0.0, duration)?);
            merged.grid.validate()?;
        }

        log::info!(
            "Merged {} unit(s) into {} grid(s)",
            utterances.len(),
            grids.len()
        );
        Ok(MergeResult { grids, overlaps })
    }
}
