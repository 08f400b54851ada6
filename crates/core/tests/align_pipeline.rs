//! End-to-end run of the aligner facade with real file adapters and a
//! scripted engine standing in for HTK.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use forced_align_core::alignment::domain::alignment_error::AlignmentEngineError;
use forced_align_core::alignment::domain::utterance_aligner::{
    AlignmentRequest, UtteranceAligner, UtteranceAlignment,
};
use forced_align_core::audio::infrastructure::wav_duration_probe::WavDurationProbe;
use forced_align_core::pipeline::aligner::{Aligner, AlignmentJob};
use forced_align_core::pipeline::infrastructure::threaded_alignment_executor::ThreadedAlignmentExecutor;
use forced_align_core::pipeline::pipeline_logger::NullPipelineLogger;
use forced_align_core::pipeline::prompt::NoPrompt;
use forced_align_core::shared::config::AlignerConfig;
use forced_align_core::textgrid::domain::textgrid::{Interval, TextGrid};
use forced_align_core::textgrid::infrastructure::praat_textgrid_reader::PraatTextGridReader;
use forced_align_core::textgrid::infrastructure::praat_textgrid_writer::PraatTextGridWriter;
use forced_align_core::transcript::infrastructure::tab_transcript_reader::TabTranscriptReader;

/// Splits each window evenly between its words, one phone per word.
struct EvenSplitAligner;

impl UtteranceAligner for EvenSplitAligner {
    fn name(&self) -> &str {
        "even-split"
    }

    fn align(&self, request: &AlignmentRequest) -> Result<UtteranceAlignment, AlignmentEngineError> {
        if request.words.is_empty() {
            return Err(AlignmentEngineError::UnparsableOutput("no words".to_string()));
        }
        let step = request.duration / request.words.len() as f64;
        let mut alignment = UtteranceAlignment::default();
        for (k, word) in request.words.iter().enumerate() {
            let start = k as f64 * step;
            let end = start + step;
            alignment.phones.push(Interval::new(start, end, "AH0"));
            alignment.words.push(Interval::new(start, end, word.as_str()));
        }
        Ok(alignment)
    }
}

/// Frames the words with leading and trailing `sil` and puts a 0.1 s `sp`
/// after every word but the last, the way HVite lays out an utterance.
struct PausingAligner;

impl UtteranceAligner for PausingAligner {
    fn name(&self) -> &str {
        "pausing"
    }

    fn align(&self, request: &AlignmentRequest) -> Result<UtteranceAlignment, AlignmentEngineError> {
        let d = request.duration;
        let slot = (d - 0.2) / request.words.len() as f64;
        let mut alignment = UtteranceAlignment::default();
        let mut push = |start: f64, end: f64, word: &str, phone: &str| {
            alignment.words.push(Interval::new(start, end, word));
            alignment.phones.push(Interval::new(start, end, phone));
        };
        push(0.0, 0.1, "sil", "sil");
        let last = request.words.len() - 1;
        for (k, word) in request.words.iter().enumerate() {
            let start = 0.1 + k as f64 * slot;
            let end = start + slot;
            if k == last {
                push(start, end, word.as_str(), "AH0");
            } else {
                push(start, end - 0.1, word.as_str(), "AH0");
                push(end - 0.1, end, "sp", "sp");
            }
        }
        push(d - 0.1, d, "sil", "sil");
        Ok(alignment)
    }
}

fn write_silence(path: &Path, seconds: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..(seconds * 16_000.0) as usize {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn labels(grid: &TextGrid, tier: &str) -> Vec<String> {
    grid.tier(tier)
        .unwrap_or_else(|| panic!("missing tier {tier}"))
        .intervals()
        .iter()
        .map(|i| i.label.clone())
        .collect()
}

const DICTIONARY: &str =
    "I  AY1\nTHINK  TH IH1 NG K\nSO  S OW1\nOKAY  OW2 K EY1\nTHEN  DH EH1 N\n";

fn setup(dir: &Path, transcript: &str) -> AlignmentJob {
    write_silence(&dir.join("int.wav"), 4.0);
    fs::write(dir.join("int.txt"), transcript).unwrap();
    fs::write(dir.join("dict"), DICTIONARY).unwrap();
    AlignmentJob {
        audio: dir.join("int.wav"),
        transcript: dir.join("int.txt"),
        output: dir.join("int.TextGrid"),
        dictionary: dir.join("dict"),
        import: None,
    }
}

fn aligner(dir: &Path, engine: Arc<dyn UtteranceAligner>) -> Aligner {
    let config = AlignerConfig {
        no_prompt: true,
        temp_dir: Some(dir.to_path_buf()),
        ..Default::default()
    };
    Aligner::new(
        config,
        Box::new(TabTranscriptReader::new()),
        engine,
        Box::new(WavDurationProbe::new()),
        Box::new(PraatTextGridWriter::new(false)),
        Box::new(ThreadedAlignmentExecutor::new(2)),
        Box::new(NoPrompt),
        Box::new(NullPipelineLogger),
    )
}

/// Every tier must run from 0 to `end` without gaps.
fn assert_covers(grid: &TextGrid, tier: &str, end: f64) {
    let intervals = grid.tier(tier).unwrap().intervals();
    assert_abs_diff_eq!(intervals[0].start, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(intervals.last().unwrap().end, end, epsilon = 1e-6);
    for pair in intervals.windows(2) {
        assert_abs_diff_eq!(pair[0].end, pair[1].start, epsilon = 1e-6);
    }
}

#[test]
fn test_align_writes_readable_textgrid() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let job = setup(
        dir,
        "Mary\tMary\t0.5\t1.5\tI think so\n\
         John\tJohn\t2.0\t3.0\tokay then\n\
         style\tstyle\t0.0\t3.0\tr\n",
    );
    let mut aligner = aligner(dir, Arc::new(EvenSplitAligner));

    let summary = aligner.align(&job).unwrap();

    assert_eq!(summary.aligned, 2);
    assert!(summary.failures.is_empty());
    assert_abs_diff_eq!(summary.duration, 4.0, epsilon = 1e-9);

    let grid = PraatTextGridReader::new()
        .read(&dir.join("int.TextGrid"))
        .unwrap();
    assert_abs_diff_eq!(grid.end, 4.0, epsilon = 1e-6);
    assert_eq!(labels(&grid, "Mary - word"), vec!["", "I", "THINK", "SO", ""]);
    assert_eq!(labels(&grid, "John - word"), vec!["", "OKAY", "THEN", ""]);
    assert_eq!(labels(&grid, "style"), vec!["R", ""]);

    let john = grid.tier("John - word").unwrap().intervals();
    assert_abs_diff_eq!(john[1].start, 2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(john[2].end, 3.0, epsilon = 1e-6);

    assert!(dir.join("int.alignment.log").exists());
    assert!(!dir.join("int.errorlog").exists());

    // A second run without force must not overwrite the result.
    assert!(aligner.align(&job).is_err());
}

#[test]
fn test_engine_pauses_reach_the_written_tiers() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let job = setup(
        dir,
        "Mary\tMary\t0.5\t1.5\tI think\n\
         John\tJohn\t2.0\t3.0\tokay then\n",
    );
    let mut aligner = aligner(dir, Arc::new(PausingAligner));

    let summary = aligner.align(&job).unwrap();
    assert_eq!(summary.aligned, 2);
    assert!(summary.failures.is_empty());
    assert!(summary.overlaps.is_empty());

    let grid = PraatTextGridReader::new()
        .read(&dir.join("int.TextGrid"))
        .unwrap();
    assert_eq!(
        labels(&grid, "Mary - word"),
        vec!["", "sil", "I", "sp", "THINK", "sil", ""]
    );
    assert_eq!(
        labels(&grid, "Mary - phone"),
        vec!["", "sil", "AH0", "sp", "AH0", "sil", ""]
    );
    assert_eq!(
        labels(&grid, "John - word"),
        vec!["", "sil", "OKAY", "sp", "THEN", "sil", ""]
    );
    for tier in ["Mary - word", "Mary - phone", "John - word", "John - phone"] {
        assert_covers(&grid, tier, 4.0);
    }

    let mary = grid.tier("Mary - word").unwrap().intervals();
    assert_abs_diff_eq!(mary[1].start, 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(mary[3].start, 0.9, epsilon = 1e-6);
    assert_abs_diff_eq!(mary[3].end, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(mary[5].end, 1.5, epsilon = 1e-6);
}
