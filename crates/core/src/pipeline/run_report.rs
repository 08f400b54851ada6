use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::alignment::domain::engine_input::WordStats;
use crate::shared::constants::{ERROR_LOG_EXTENSION, STATS_LOG_SUFFIX};
use crate::textgrid::domain::textgrid::Overlap;

/// An annotation unit the engine could not align.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceFailure {
    pub line: usize,
    pub speaker: String,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub reason: String,
}

/// Figures for `<stem>.alignment.log`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub audio: PathBuf,
    pub transcript: PathBuf,
    pub words: WordStats,
    pub utterances_aligned: usize,
    pub utterances_total: usize,
    pub duration: f64,
}

/// `<output>.errorlog`
pub fn error_log_path(output: &Path) -> PathBuf {
    output.with_extension(ERROR_LOG_EXTENSION)
}

/// `<output stem>.alignment.log`
pub fn stats_log_path(output: &Path) -> PathBuf {
    output.with_extension(STATS_LOG_SUFFIX)
}

/// Append failed units and overlapping intervals to the error log.
/// Nothing is written when there is nothing to report.
pub fn append_error_log(
    path: &Path,
    failures: &[UtteranceFailure],
    overlaps: &[Overlap],
) -> std::io::Result<()> {
    if failures.is_empty() && overlaps.is_empty() {
        return Ok(());
    }
    let mut out = String::new();
    for failure in failures {
        let _ = writeln!(
            out,
            "Could not align line {} ({}, {:.3}-{:.3}): {}\n\t{}",
            failure.line, failure.speaker, failure.start, failure.end, failure.reason, failure.text
        );
    }
    for overlap in overlaps {
        let _ = writeln!(out, "Overlapping intervals: {overlap}");
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(out.as_bytes())?;
    log::warn!(
        "{} failure(s) and {} overlap(s) recorded in {}",
        failures.len(),
        overlaps.len(),
        path.display()
    );
    Ok(())
}

pub fn format_stats(stats: &RunStats, timestamp: &str) -> String {
    let words = stats.words;
    let pct = |n: usize| {
        if words.words == 0 {
            0.0
        } else {
            n as f64 / words.words as f64 * 100.0
        }
    };
    let mut out = String::new();
    let _ = writeln!(out, "Alignment statistics for {}", stats.audio.display());
    let _ = writeln!(out, "Date: {timestamp}");
    let _ = writeln!(out, "Transcript: {}", stats.transcript.display());
    let _ = writeln!(out, "Duration: {:.3} seconds", stats.duration);
    let _ = writeln!(
        out,
        "Units aligned: {} of {}",
        stats.utterances_aligned, stats.utterances_total
    );
    let _ = writeln!(out, "Words: {}", words.words);
    let _ = writeln!(
        out,
        "Uncertain transcriptions: {} ({:.1}%)",
        words.uncertain,
        pct(words.uncertain)
    );
    let _ = writeln!(
        out,
        "Unclear passages: {} ({:.1}%)",
        words.unclear,
        pct(words.unclear)
    );
    out
}

pub fn write_stats_log(path: &Path, stats: &RunStats) -> std::io::Result<()> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    fs::write(path, format_stats(stats, &timestamp))?;
    log::info!("Alignment statistics written to {}", path.display());
    Ok(())
}
