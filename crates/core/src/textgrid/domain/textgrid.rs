use std::fmt;

use super::textgrid_error::TextGridError;
use crate::shared::time::{round_ms, same_time, TIME_EPSILON};

/// A labelled time span, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
    pub label: String,
}

impl Interval {
    /// Boundaries are rounded to milliseconds.
    pub fn new(start: f64, end: f64, label: impl Into<String>) -> Self {
        Self {
            start: round_ms(start),
            end: round_ms(end),
            label: label.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start + TIME_EPSILON
    }

    pub fn shifted(&self, offset: f64) -> Self {
        Self::new(self.start + offset, self.end + offset, self.label.clone())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}-{:.3} \"{}\"", self.start, self.end, self.label)
    }
}

/// Two intervals of one tier whose time spans intersect.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub tier: String,
    pub first: Interval,
    pub second: Interval,
}

impl fmt::Display for Overlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interval {} and interval {} on tier {}.",
            self.first, self.second, self.tier
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTier {
    pub name: String,
    pub start: f64,
    pub end: f64,
    intervals: Vec<Interval>,
}

impl IntervalTier {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_bounds(name, 0.0, 0.0)
    }

    pub fn with_bounds(name: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            name: name.into(),
            start: round_ms(start),
            end: round_ms(end),
            intervals: Vec::new(),
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Append an interval, widening the tier bounds to include it.
    pub fn push(&mut self, interval: Interval) {
        self.start = self.start.min(interval.start);
        self.end = self.end.max(interval.end);
        self.intervals.push(interval);
    }

    /// Append every interval of `other`.
    pub fn append(&mut self, other: &IntervalTier) {
        for interval in &other.intervals {
            self.push(interval.clone());
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn offset(&mut self, offset: f64) {
        self.start = round_ms(self.start + offset);
        self.end = round_ms(self.end + offset);
        for interval in &mut self.intervals {
            *interval = interval.shifted(offset);
        }
    }

    /// Set the tier bounds to `[start, end]`, clipping intervals that
    /// reach past them.
    pub fn fit_to(&mut self, start: f64, end: f64) {
        let (start, end) = (round_ms(start), round_ms(end));
        for interval in &mut self.intervals {
            interval.start = interval.start.max(start);
            interval.end = interval.end.min(end);
        }
        let before = self.intervals.len();
        self.intervals.retain(|i| !i.is_empty());
        if self.intervals.len() < before {
            log::debug!(
                "Tier '{}': dropped {} interval(s) outside {start:.3}-{end:.3}",
                self.name,
                before - self.intervals.len()
            );
        }
        self.start = start;
        self.end = end;
    }

    /// Sort intervals, clip overlapping ones and fill every gap (including
    /// the edges of the tier) with an empty-label interval.
    ///
    /// Returns the overlaps that had to be clipped.
    pub fn tidy_up(&mut self) -> Vec<Overlap> {
        let mut sorted: Vec<Interval> = self
            .intervals
            .drain(..)
            .filter(|i| !i.is_empty())
            .collect();
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut tidy: Vec<Interval> = Vec::with_capacity(sorted.len());
        let mut overlaps = Vec::new();
        let mut cursor = self.start;

        for mut interval in sorted {
            if let Some(last) = tidy.last() {
                if interval.start < last.end - TIME_EPSILON {
                    overlaps.push(Overlap {
                        tier: self.name.clone(),
                        first: last.clone(),
                        second: interval.clone(),
                    });
                    interval.start = last.end;
                    if interval.is_empty() {
                        continue;
                    }
                }
            }
            if interval.start > cursor + TIME_EPSILON {
                tidy.push(Interval::new(cursor, interval.start, ""));
            }
            cursor = interval.end;
            tidy.push(interval);
        }
        if self.end > cursor + TIME_EPSILON {
            tidy.push(Interval::new(cursor, self.end, ""));
        }

        for overlap in &overlaps {
            log::warn!("Overlapping intervals: {overlap}");
        }
        self.intervals = tidy;
        overlaps
    }

    /// Check that the tier is a contiguous partition of `[self.start, self.end]`.
    pub fn validate(&self) -> Result<(), TextGridError> {
        let (Some(first), Some(last)) = (self.intervals.first(), self.intervals.last()) else {
            return Err(TextGridError::Coverage {
                tier: self.name.clone(),
                start: self.start,
                end: self.start,
                expected_start: self.start,
                expected_end: self.end,
            });
        };
        if !same_time(first.start, self.start) || !same_time(last.end, self.end) {
            return Err(TextGridError::Coverage {
                tier: self.name.clone(),
                start: first.start,
                end: last.end,
                expected_start: self.start,
                expected_end: self.end,
            });
        }
        for interval in &self.intervals {
            if interval.is_empty() {
                return Err(TextGridError::EmptyInterval {
                    tier: self.name.clone(),
                    start: interval.start,
                    end: interval.end,
                });
            }
        }
        for pair in self.intervals.windows(2) {
            if !same_time(pair[0].end, pair[1].start) {
                return Err(TextGridError::NotContiguous {
                    tier: self.name.clone(),
                    at: pair[0].end,
                });
            }
        }
        Ok(())
    }
}

/// A named set of interval tiers sharing one time range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextGrid {
    pub start: f64,
    pub end: f64,
    tiers: Vec<IntervalTier>,
}

impl TextGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(start: f64, end: f64) -> Self {
        Self {
            start: round_ms(start),
            end: round_ms(end),
            tiers: Vec::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn tiers(&self) -> &[IntervalTier] {
        &self.tiers
    }

    pub fn tier(&self, name: &str) -> Option<&IntervalTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    pub fn tier_mut(&mut self, name: &str) -> Option<&mut IntervalTier> {
        self.tiers.iter_mut().find(|t| t.name == name)
    }

    /// Add a tier, widening the grid bounds to include it.
    pub fn push_tier(&mut self, tier: IntervalTier) {
        self.start = self.start.min(tier.start);
        self.end = self.end.max(tier.end);
        self.tiers.push(tier);
    }

    pub fn offset(&mut self, offset: f64) {
        self.start = round_ms(self.start + offset);
        self.end = round_ms(self.end + offset);
        for tier in &mut self.tiers {
            tier.offset(offset);
        }
    }

    /// Stretch every tier over `[start, end]` and tidy it up.
    ///
    /// Returns the overlaps found on all tiers.
    pub fn tidy_up(&mut self, start: f64, end: f64) -> Result<Vec<Overlap>, TextGridError> {
        if end - start <= TIME_EPSILON {
            return Err(TextGridError::ZeroDuration {
                duration: end - start,
            });
        }
        self.start = round_ms(start);
        self.end = round_ms(end);

        let mut overlaps = Vec::new();
        for tier in &mut self.tiers {
            tier.fit_to(start, end);
            overlaps.extend(tier.tidy_up());
            log::debug!("Tidied tier '{}' ({} intervals)", tier.name, tier.len());
        }
        Ok(overlaps)
    }

    /// Check that the grid has a positive duration and every tier spans it
    /// exactly.
    pub fn validate(&self) -> Result<(), TextGridError> {
        if self.duration() <= TIME_EPSILON {
            return Err(TextGridError::ZeroDuration {
                duration: self.duration(),
            });
        }
        for tier in &self.tiers {
            if !same_time(tier.start, self.start) || !same_time(tier.end, self.end) {
                return Err(TextGridError::Coverage {
                    tier: tier.name.clone(),
                    start: tier.start,
                    end: tier.end,
                    expected_start: self.start,
                    expected_end: self.end,
                });
            }
            tier.validate()?;
        }
        Ok(())
    }
}
