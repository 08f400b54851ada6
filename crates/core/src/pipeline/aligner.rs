use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tempfile::TempDir;

use crate::alignment::domain::engine_input::{prepare_words, EngineInput, WordStats};
use crate::alignment::domain::markup_restorer::restore_markup;
use crate::alignment::domain::utterance_aligner::{AlignmentRequest, UtteranceAligner};
use crate::audio::domain::audio_error::AudioError;
use crate::audio::domain::duration_probe::DurationProbe;
use crate::dictionary::domain::dictionary_checker::{CheckMode, DictionaryCheck, DictionaryChecker};
use crate::dictionary::domain::dictionary_error::DictionaryError;
use crate::dictionary::domain::pronunciation_dictionary::PronunciationDictionary;
use crate::dictionary::infrastructure::cmu_dictionary_file::{
    read_dictionary, read_import_file, record_additions, write_dictionary, write_unknown_words,
};
use crate::shared::config::{AlignerConfig, OutputMode, UnknownWordPolicy};
use crate::shared::constants::{DICTIONARY_FILE_NAME, TEXTGRID_EXTENSION};
use crate::textgrid::domain::textgrid::{IntervalTier, Overlap};
use crate::textgrid::domain::textgrid_error::TextGridError;
use crate::textgrid::domain::textgrid_merger::{AlignedUtterance, MergeResult, TextGridMerger};
use crate::textgrid::domain::textgrid_writer::TextGridWriter;
use crate::transcript::domain::transcript::{Transcript, Utterance};
use crate::transcript::domain::transcript_error::TranscriptError;
use crate::transcript::domain::transcript_reader::TranscriptReader;

use super::align_error::AlignError;
use super::alignment_executor::AlignmentExecutor;
use super::pipeline_logger::PipelineLogger;
use super::prompt::{ask_pronunciations, confirm_continue, Prompter};
use super::run_report::{
    append_error_log, error_log_path, stats_log_path, write_stats_log, RunStats, UtteranceFailure,
};

/// Inputs and output of one alignment run.
#[derive(Debug, Clone)]
pub struct AlignmentJob {
    pub audio: PathBuf,
    pub transcript: PathBuf,
    pub output: PathBuf,
    pub dictionary: PathBuf,
    pub import: Option<PathBuf>,
}

/// Inputs of a transcript check that runs no alignment.
#[derive(Debug, Clone)]
pub struct CheckJob {
    pub transcript: PathBuf,
    pub dictionary: PathBuf,
    pub import: Option<PathBuf>,
    pub unknown_words: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentSummary {
    pub outputs: Vec<PathBuf>,
    pub aligned: usize,
    pub skipped: usize,
    pub failures: Vec<UtteranceFailure>,
    pub words: WordStats,
    pub overlaps: Vec<Overlap>,
    pub duration: f64,
}

/// An utterance that made it into the engine batch.
struct PendingUnit<'a> {
    utterance: &'a Utterance,
    input: EngineInput,
}

/// Runs the whole alignment: transcript in, TextGrid(s) out.
///
/// Every external concern sits behind a port, so the CLI wires the HTK,
/// WAV and Praat adapters and tests wire stubs.
pub struct Aligner {
    config: AlignerConfig,
    reader: Box<dyn TranscriptReader>,
    engine: Arc<dyn UtteranceAligner>,
    probe: Box<dyn DurationProbe>,
    writer: Box<dyn TextGridWriter>,
    executor: Box<dyn AlignmentExecutor>,
    prompter: Box<dyn Prompter>,
    logger: Box<dyn PipelineLogger>,
}

impl Aligner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AlignerConfig,
        reader: Box<dyn TranscriptReader>,
        engine: Arc<dyn UtteranceAligner>,
        probe: Box<dyn DurationProbe>,
        writer: Box<dyn TextGridWriter>,
        executor: Box<dyn AlignmentExecutor>,
        prompter: Box<dyn Prompter>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            config,
            reader,
            engine,
            probe,
            writer,
            executor,
            prompter,
            logger,
        }
    }

    pub fn read_transcript(&self, path: &Path) -> Result<Transcript, TranscriptError> {
        self.reader.read(path)
    }

    pub fn check_transcript(&self, transcript: &Transcript) -> Result<(), TranscriptError> {
        transcript.validate()
    }

    /// Add derived `-IN'` pronunciations, then look up every transcript word.
    pub fn check_against_dictionary(
        &self,
        transcript: &Transcript,
        dictionary: &mut PronunciationDictionary,
        mode: CheckMode,
    ) -> DictionaryCheck {
        let derived = dictionary.derive_in_forms(
            transcript
                .utterances
                .iter()
                .flat_map(|u| u.words.iter().map(String::as_str)),
        );
        if !derived.is_empty() {
            log::info!("Derived pronunciations for {}", derived.join(", "));
        }
        DictionaryChecker::new(mode, self.config.verbose).check(transcript, dictionary)
    }

    pub fn get_duration(&self, audio: &Path) -> Result<f64, AudioError> {
        self.probe.duration(audio)
    }

    pub fn process_style_tier(&self, transcript: &Transcript) -> Option<IntervalTier> {
        TextGridMerger::process_style_tier(&transcript.style_entries)
    }

    pub fn merge_textgrids(
        &self,
        utterances: &[AlignedUtterance],
        style: Option<&IntervalTier>,
        duration: f64,
    ) -> Result<MergeResult, TextGridError> {
        TextGridMerger::new(self.config.output_mode).merge(utterances, style, duration)
    }

    /// Check a transcript against the dictionary and write the unknown
    /// words to `job.unknown_words`.
    pub fn check_only(&mut self, job: &CheckJob) -> Result<DictionaryCheck, AlignError> {
        let transcript = self.read_transcript(&job.transcript)?;
        self.check_transcript(&transcript)?;
        let (mut dictionary, _) = load_dictionary(&job.dictionary, job.import.as_deref())?;
        let check = self.check_against_dictionary(&transcript, &mut dictionary, CheckMode::CheckOnly);
        write_unknown_words(&job.unknown_words, &check.misses)?;
        self.logger.note(&format!(
            "{} unknown word(s) in {}",
            check.missing.len(),
            job.transcript.display()
        ));
        Ok(check)
    }

    pub fn align(&mut self, job: &AlignmentJob) -> Result<AlignmentSummary, AlignError> {
        if self.config.output_mode == OutputMode::Combined {
            self.ensure_writable(&job.output)?;
        }

        let t0 = Instant::now();
        self.logger
            .note(&format!("Reading transcript {}", job.transcript.display()));
        let transcript = self.read_transcript(&job.transcript)?;
        self.check_transcript(&transcript)?;
        self.logger.note(&format!(
            "{} utterance(s), {} word(s)",
            transcript.utterances.len(),
            transcript.word_count()
        ));
        if self.config.output_mode == OutputMode::PerSpeaker {
            for speaker in transcript.speakers() {
                self.ensure_writable(&per_speaker_path(&job.output, &speaker))?;
            }
        }
        self.logger.timing("read", elapsed_ms(t0));

        let t0 = Instant::now();
        let dictionary = self.prepare_dictionary(job, &transcript)?;
        self.logger.timing("dictionary", elapsed_ms(t0));

        let duration = self.get_duration(&job.audio)?;
        if duration <= 0.0 {
            return Err(TextGridError::ZeroDuration { duration }.into());
        }
        self.logger
            .note(&format!("{} is {duration:.3}s long", job.audio.display()));

        let run_dir = self.scratch_dir()?;
        let dictionary_path = run_dir.path().join(DICTIONARY_FILE_NAME);
        write_dictionary(&dictionary_path, &dictionary)?;

        let mut skipped = 0;
        let mut words = WordStats::default();
        let mut units = Vec::new();
        let mut requests = Vec::new();
        let mut scratch_guards = Vec::new();
        for utterance in &transcript.utterances {
            let end = utterance.end.min(duration);
            if end - utterance.start < self.config.min_utterance_duration {
                log::warn!(
                    "Skipping line {}: {:.3}-{:.3} is too short to align",
                    utterance.line,
                    utterance.start,
                    end
                );
                skipped += 1;
                continue;
            }
            let input = prepare_words(&utterance.words, &dictionary);
            words += input.stats;
            if input.is_empty() {
                log::warn!("Skipping line {}: no alignable words", utterance.line);
                skipped += 1;
                continue;
            }

            let identifier = format!("utt_{:04}", utterance.line);
            let scratch = tempfile::Builder::new()
                .prefix(&format!("{identifier}_"))
                .tempdir_in(run_dir.path())
                .map_err(AlignError::Scratch)?;
            self.logger.metric("words", input.words.len() as f64);
            requests.push(AlignmentRequest {
                identifier,
                audio: job.audio.clone(),
                start: utterance.start,
                duration: end - utterance.start,
                words: input.labels(),
                dictionary: dictionary_path.clone(),
                scratch_dir: scratch.path().to_path_buf(),
            });
            scratch_guards.push(scratch);
            units.push(PendingUnit { utterance, input });
        }

        let total = requests.len();
        self.logger.note(&format!(
            "Aligning {total} utterance(s) with {}",
            self.engine.name()
        ));
        let t0 = Instant::now();
        let no_prompt = self.config.no_prompt;
        let prompter = &mut self.prompter;
        let logger = &mut self.logger;
        let mut completed = 0;
        let mut stopped = false;
        let outcomes = self.executor.execute(
            self.engine.clone(),
            requests,
            &mut |index, outcome| {
                completed += 1;
                logger.progress(completed, total);
                let Err(e) = outcome else {
                    return true;
                };
                let utterance = units[index].utterance;
                log::warn!("Line {} could not be aligned: {e}", utterance.line);
                let message = format!("Line {}: {e}", utterance.line);
                if no_prompt || confirm_continue(prompter.as_mut(), &message) {
                    return true;
                }
                stopped = true;
                false
            },
        );
        self.logger.timing("engine", elapsed_ms(t0));
        drop(scratch_guards);

        let mut aligned = Vec::new();
        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        for (index, outcome) in outcomes {
            seen.insert(index);
            let unit = &units[index];
            let restored = outcome.and_then(|alignment| {
                restore_markup(&alignment.words, &unit.input.words)
                    .map(|words| (alignment.phones, words))
            });
            match restored {
                Ok((phones, words)) => aligned.push(AlignedUtterance {
                    speaker: unit.utterance.speaker(),
                    start: unit.utterance.start,
                    phones,
                    words,
                }),
                Err(e) => failures.push(failure(unit.utterance, e.to_string())),
            }
        }
        if !stopped {
            for (index, unit) in units.iter().enumerate() {
                if !seen.contains(&index) {
                    failures.push(failure(unit.utterance, "no result from engine".to_string()));
                }
            }
        }

        let error_log = error_log_path(&job.output);
        if stopped {
            append_error_log(&error_log, &failures, &[]).map_err(report_error(&error_log))?;
            return Err(AlignError::Aborted {
                failed: failures.len(),
            });
        }

        let t0 = Instant::now();
        let style = self.process_style_tier(&transcript);
        let merged = self.merge_textgrids(&aligned, style.as_ref(), duration)?;
        self.logger.timing("merge", elapsed_ms(t0));

        let t0 = Instant::now();
        let mut outputs = Vec::new();
        for merged_grid in &merged.grids {
            let path = match &merged_grid.speaker {
                Some(speaker) => per_speaker_path(&job.output, speaker),
                None => job.output.clone(),
            };
            self.writer.write(&merged_grid.grid, &path)?;
            self.logger.note(&format!("Wrote {}", path.display()));
            outputs.push(path);
        }
        self.logger.timing("write", elapsed_ms(t0));

        append_error_log(&error_log, &failures, &merged.overlaps)
            .map_err(report_error(&error_log))?;
        let stats_log = stats_log_path(&job.output);
        write_stats_log(
            &stats_log,
            &RunStats {
                audio: job.audio.clone(),
                transcript: job.transcript.clone(),
                words,
                utterances_aligned: aligned.len(),
                utterances_total: transcript.utterances.len(),
                duration,
            },
        )
        .map_err(report_error(&stats_log))?;
        self.logger.summary();

        Ok(AlignmentSummary {
            outputs,
            aligned: aligned.len(),
            skipped,
            failures,
            words,
            overlaps: merged.overlaps,
            duration,
        })
    }

    fn ensure_writable(&self, path: &Path) -> Result<(), TextGridError> {
        if !self.config.force && path.exists() {
            return Err(TextGridError::OutputExists {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Load, extend and check the dictionary; unknown words are offered to
    /// the prompter and new entries recorded next to the output.
    fn prepare_dictionary(
        &mut self,
        job: &AlignmentJob,
        transcript: &Transcript,
    ) -> Result<PronunciationDictionary, AlignError> {
        let (mut dictionary, mut additions) =
            load_dictionary(&job.dictionary, job.import.as_deref())?;
        let mut check = self.check_against_dictionary(transcript, &mut dictionary, CheckMode::Align);

        if !check.is_ok() && !self.config.no_prompt {
            let answered = ask_pronunciations(self.prompter.as_mut(), &check.misses);
            if !answered.is_empty() {
                dictionary.merge(&answered);
                additions.merge(&answered);
                check = DictionaryChecker::new(CheckMode::Align, false).check(transcript, &dictionary);
            }
        }

        if !check.is_ok() {
            let missing: Vec<String> = check.missing.into_iter().collect();
            match self.config.unknown_words {
                UnknownWordPolicy::Abort => {
                    return Err(DictionaryError::UnknownWords { words: missing }.into());
                }
                UnknownWordPolicy::Continue => log::warn!(
                    "{} word(s) not in the dictionary will be left out: {}",
                    missing.len(),
                    missing.join(", ")
                ),
            }
        }

        let output_dir = job
            .output
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        record_additions(output_dir, &additions)?;
        Ok(dictionary)
    }

    fn scratch_dir(&self) -> Result<TempDir, AlignError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("forced-align-");
        let dir = match &self.config.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        };
        dir.map_err(AlignError::Scratch)
    }
}

/// Dictionary file plus optional import file; also returns the imported
/// entries on their own.
fn load_dictionary(
    path: &Path,
    import: Option<&Path>,
) -> Result<(PronunciationDictionary, PronunciationDictionary), DictionaryError> {
    let mut dictionary = read_dictionary(path)?;
    let imported = match import {
        Some(import) => read_import_file(import)?,
        None => PronunciationDictionary::new(),
    };
    let added = dictionary.merge(&imported);
    if added > 0 {
        log::info!("{added} imported pronunciation(s) added to the dictionary");
    }
    Ok((dictionary, imported))
}

/// `<dir>/<stem>_<speaker>.TextGrid`
pub fn per_speaker_path(output: &Path, speaker: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}_{speaker}.{TEXTGRID_EXTENSION}"))
}

fn failure(utterance: &Utterance, reason: String) -> UtteranceFailure {
    UtteranceFailure {
        line: utterance.line,
        speaker: utterance.speaker(),
        start: utterance.start,
        end: utterance.end,
        text: utterance.text.clone(),
        reason,
    }
}

fn report_error(path: &Path) -> impl FnOnce(std::io::Error) -> AlignError + '_ {
    move |source| AlignError::Report {
        path: path.to_path_buf(),
        source,
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    use crate::alignment::domain::alignment_error::AlignmentEngineError;
    use crate::alignment::domain::utterance_aligner::UtteranceAlignment;
    use crate::pipeline::alignment_executor::SequentialAlignmentExecutor;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::pipeline::prompt::tests::ScriptedPrompter;
    use crate::pipeline::prompt::NoPrompt;
    use crate::textgrid::domain::textgrid::{Interval, TextGrid};
    use crate::transcript::infrastructure::tab_transcript_reader::TabTranscriptReader;
    use tempfile::TempDir;

    // --- Stubs ---

    /// Gives every word 0.2 s and one phone, failing listed identifiers.
    struct StubEngine {
        fail: Vec<String>,
    }

    impl UtteranceAligner for StubEngine {
        fn name(&self) -> &str {
            "stub"
        }

        fn align(
            &self,
            request: &AlignmentRequest,
        ) -> Result<UtteranceAlignment, AlignmentEngineError> {
            if self.fail.contains(&request.identifier) {
                return Err(AlignmentEngineError::UnparsableOutput("stub failure".to_string()));
            }
            let mut alignment = UtteranceAlignment::default();
            for (k, word) in request.words.iter().enumerate() {
                let (start, end) = (k as f64 * 0.2, (k + 1) as f64 * 0.2);
                alignment.phones.push(Interval::new(start, end, "AH0"));
                alignment.words.push(Interval::new(start, end, word.as_str()));
            }
            Ok(alignment)
        }
    }

    struct StubProbe(f64);

    impl DurationProbe for StubProbe {
        fn duration(&self, _audio: &Path) -> Result<f64, AudioError> {
            Ok(self.0)
        }
    }

    type Written = Arc<Mutex<Vec<(PathBuf, TextGrid)>>>;

    struct RecordingWriter {
        written: Written,
    }

    impl TextGridWriter for RecordingWriter {
        fn write(&self, grid: &TextGrid, path: &Path) -> Result<(), TextGridError> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), grid.clone()));
            Ok(())
        }
    }

    /// Keeps every note and stage name it receives.
    #[derive(Default)]
    struct RecordingLogger {
        notes: Arc<Mutex<Vec<String>>>,
        stages: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, _done: usize, _total: usize) {}

        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.stages.lock().unwrap().push(stage.to_string());
        }

        fn metric(&mut self, _name: &str, _value: f64) {}

        fn note(&mut self, message: &str) {
            self.notes.lock().unwrap().push(message.to_string());
        }
    }

    // --- Fixture ---

    const TRANSCRIPT: &str = "Mary\tMary\t0.5\t1.5\tI think so\n\
                              John\tJohn\t1.0\t2.0\t((well)) okay\n\
                              style\tstyle\t0.0\t2.0\tr\n";

    const DICTIONARY: &str = "I  AY1\nTHINK  TH IH1 NG K\nSO  S OW1\nWELL  W EH1 L\nOKAY  OW2 K EY1\n";

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(transcript: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("int.txt"), transcript).unwrap();
            fs::write(dir.path().join("dict"), DICTIONARY).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn job(&self) -> AlignmentJob {
            AlignmentJob {
                audio: self.path("int.wav"),
                transcript: self.path("int.txt"),
                output: self.path("int.TextGrid"),
                dictionary: self.path("dict"),
                import: None,
            }
        }

        fn aligner(
            &self,
            config: AlignerConfig,
            fail: &[&str],
            duration: f64,
            prompter: Box<dyn Prompter>,
        ) -> (Aligner, Written) {
            let written = Written::default();
            let config = AlignerConfig {
                temp_dir: Some(self.dir.path().to_path_buf()),
                ..config
            };
            let aligner = Aligner::new(
                config,
                Box::new(TabTranscriptReader::new()),
                Arc::new(StubEngine {
                    fail: fail.iter().map(|f| f.to_string()).collect(),
                }),
                Box::new(StubProbe(duration)),
                Box::new(RecordingWriter {
                    written: written.clone(),
                }),
                Box::new(SequentialAlignmentExecutor),
                prompter,
                Box::new(NullPipelineLogger),
            );
            (aligner, written)
        }
    }

    fn quiet() -> AlignerConfig {
        AlignerConfig {
            no_prompt: true,
            ..Default::default()
        }
    }

    fn labels(grid: &TextGrid, tier: &str) -> Vec<String> {
        grid.tier(tier)
            .unwrap()
            .intervals()
            .iter()
            .map(|i| i.label.clone())
            .collect()
    }

    // --- Tests ---

    #[test]
    fn test_align_combined_writes_one_grid() {
        let fx = Fixture::new(TRANSCRIPT);
        let (mut aligner, written) = fx.aligner(quiet(), &[], 3.0, Box::new(NoPrompt));

        let summary = aligner.align(&fx.job()).unwrap();

        assert_eq!(summary.outputs, vec![fx.path("int.TextGrid")]);
        assert_eq!(summary.aligned, 2);
        assert_eq!(summary.words.words, 5);
        assert_eq!(summary.words.uncertain, 1);
        assert!(summary.failures.is_empty());

        let written = written.lock().unwrap();
        let grid = &written[0].1;
        let names: Vec<&str> = grid.tiers().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Mary - phone", "Mary - word", "John - phone", "John - word", "style"]
        );
        assert_eq!(labels(grid, "Mary - word"), vec!["", "I", "THINK", "SO", ""]);
        assert_eq!(labels(grid, "John - word"), vec!["", "((WELL))", "OKAY", ""]);
        assert_eq!(labels(grid, "style"), vec!["R", ""]);
        assert!((grid.end - 3.0).abs() < 1e-9);

        assert!(fx.path("int.alignment.log").exists());
        assert!(!fx.path("int.errorlog").exists());
    }

    #[test]
    fn test_align_per_speaker_writes_one_grid_each() {
        let fx = Fixture::new(TRANSCRIPT);
        let config = AlignerConfig {
            output_mode: OutputMode::PerSpeaker,
            ..quiet()
        };
        let (mut aligner, written) = fx.aligner(config, &[], 3.0, Box::new(NoPrompt));

        let summary = aligner.align(&fx.job()).unwrap();

        assert_eq!(
            summary.outputs,
            vec![fx.path("int_Mary.TextGrid"), fx.path("int_John.TextGrid")]
        );
        for (_, grid) in written.lock().unwrap().iter() {
            assert_eq!(grid.tiers().len(), 3);
            assert!(grid.tier("style").is_some());
        }
    }

    #[test]
    fn test_existing_output_needs_force() {
        let fx = Fixture::new(TRANSCRIPT);
        fs::write(fx.path("int.TextGrid"), "old").unwrap();
        let (mut aligner, _) = fx.aligner(quiet(), &[], 3.0, Box::new(NoPrompt));

        let err = aligner.align(&fx.job()).unwrap_err();
        assert!(matches!(
            err,
            AlignError::TextGrid(TextGridError::OutputExists { .. })
        ));

        let config = AlignerConfig {
            force: true,
            ..quiet()
        };
        let (mut aligner, _) = fx.aligner(config, &[], 3.0, Box::new(NoPrompt));
        assert!(aligner.align(&fx.job()).is_ok());
    }

    #[test]
    fn test_unknown_words_abort_when_requested() {
        let fx = Fixture::new("Mary\tMary\t0.5\t1.5\tI zyzzx\n");
        let config = AlignerConfig {
            unknown_words: UnknownWordPolicy::Abort,
            ..quiet()
        };
        let (mut aligner, written) = fx.aligner(config, &[], 3.0, Box::new(NoPrompt));

        match aligner.align(&fx.job()) {
            Err(AlignError::Dictionary(DictionaryError::UnknownWords { words })) => {
                assert_eq!(words, vec!["ZYZZX"]);
            }
            other => panic!("expected unknown words, got {other:?}"),
        }
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_words_are_dropped_by_default() {
        let fx = Fixture::new("Mary\tMary\t0.5\t1.5\tI zyzzx\n");
        let (mut aligner, written) = fx.aligner(quiet(), &[], 3.0, Box::new(NoPrompt));

        aligner.align(&fx.job()).unwrap();
        let written = written.lock().unwrap();
        assert_eq!(labels(&written[0].1, "Mary - word"), vec!["", "I", ""]);
    }

    #[test]
    fn test_prompted_pronunciation_is_used_and_recorded() {
        let fx = Fixture::new("Mary\tMary\t0.5\t1.5\tI zyzzx\n");
        let prompter = ScriptedPrompter::new(&["Z IH1 Z K S"]);
        let (mut aligner, written) =
            fx.aligner(AlignerConfig::default(), &[], 3.0, Box::new(prompter));

        aligner.align(&fx.job()).unwrap();

        let written = written.lock().unwrap();
        assert_eq!(
            labels(&written[0].1, "Mary - word"),
            vec!["", "I", "ZYZZX", ""]
        );
        let recorded = fs::read_to_string(fx.path("added_dict_entries.txt")).unwrap();
        assert!(recorded.contains("ZYZZX"));
    }

    #[test]
    fn test_failed_utterance_is_reported_and_run_continues() {
        let fx = Fixture::new(TRANSCRIPT);
        let (mut aligner, written) = fx.aligner(quiet(), &["utt_0002"], 3.0, Box::new(NoPrompt));

        let summary = aligner.align(&fx.job()).unwrap();

        assert_eq!(summary.aligned, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].line, 2);
        assert!(written.lock().unwrap()[0].1.tier("John - word").is_none());
        let log = fs::read_to_string(fx.path("int.errorlog")).unwrap();
        assert!(log.contains("Could not align line 2"));
    }

    #[test]
    fn test_declining_to_continue_aborts_the_run() {
        let fx = Fixture::new(TRANSCRIPT);
        let prompter = ScriptedPrompter::new(&["n"]);
        let (mut aligner, written) =
            fx.aligner(AlignerConfig::default(), &["utt_0001"], 3.0, Box::new(prompter));

        let err = aligner.align(&fx.job()).unwrap_err();

        assert!(matches!(err, AlignError::Aborted { failed: 1 }));
        assert!(written.lock().unwrap().is_empty());
        assert!(fx.path("int.errorlog").exists());
    }

    #[test]
    fn test_short_and_clipped_units_are_skipped() {
        let fx = Fixture::new(
            "Mary\tMary\t0.5\t0.52\tI\n\
             Mary\tMary\t1.0\t2.0\tso\n\
             John\tJohn\t2.98\t3.5\tokay\n",
        );
        let (mut aligner, _) = fx.aligner(quiet(), &[], 3.0, Box::new(NoPrompt));

        let summary = aligner.align(&fx.job()).unwrap();
        assert_eq!(summary.aligned, 1);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_zero_duration_recording_is_rejected() {
        let fx = Fixture::new(TRANSCRIPT);
        let (mut aligner, _) = fx.aligner(quiet(), &[], 0.0, Box::new(NoPrompt));

        let err = aligner.align(&fx.job()).unwrap_err();
        assert!(matches!(
            err,
            AlignError::TextGrid(TextGridError::ZeroDuration { .. })
        ));
    }

    #[test]
    fn test_check_only_writes_unknown_words() {
        let fx = Fixture::new("Mary\tMary\t0.5\t1.5\tI zyzzx so\n");
        let (mut aligner, _) = fx.aligner(quiet(), &[], 3.0, Box::new(NoPrompt));
        let job = CheckJob {
            transcript: fx.path("int.txt"),
            dictionary: fx.path("dict"),
            import: None,
            unknown_words: fx.path("unknown.txt"),
        };

        let check = aligner.check_only(&job).unwrap();

        assert!(check.missing.contains("ZYZZX"));
        let report = fs::read_to_string(fx.path("unknown.txt")).unwrap();
        assert_eq!(report, "ZYZZX\t\t\tI zyzzx so\n");
    }

    #[test]
    fn test_facade_utilities() {
        let fx = Fixture::new(TRANSCRIPT);
        let (aligner, _) = fx.aligner(quiet(), &[], 3.0, Box::new(NoPrompt));

        let transcript = aligner.read_transcript(&fx.path("int.txt")).unwrap();
        aligner.check_transcript(&transcript).unwrap();
        assert_eq!(aligner.get_duration(&fx.path("int.wav")).unwrap(), 3.0);

        let style = aligner.process_style_tier(&transcript).unwrap();
        assert_eq!(style.len(), 1);

        let merged = aligner
            .merge_textgrids(&[], Some(&style), 3.0)
            .unwrap();
        assert_eq!(merged.grids.len(), 1);
        assert!(aligner.merge_textgrids(&[], None, 0.0).is_err());
    }

    #[test]
    fn test_align_reports_run_events() {
        let fx = Fixture::new(TRANSCRIPT);
        let logger = RecordingLogger::default();
        let (notes, stages) = (logger.notes.clone(), logger.stages.clone());
        let mut aligner = Aligner::new(
            AlignerConfig {
                temp_dir: Some(fx.dir.path().to_path_buf()),
                ..quiet()
            },
            Box::new(TabTranscriptReader::new()),
            Arc::new(StubEngine { fail: vec![] }),
            Box::new(StubProbe(3.0)),
            Box::new(RecordingWriter {
                written: Written::default(),
            }),
            Box::new(SequentialAlignmentExecutor),
            Box::new(NoPrompt),
            Box::new(logger),
        );

        aligner.align(&fx.job()).unwrap();

        let notes = notes.lock().unwrap();
        assert!(notes[0].starts_with("Reading transcript"));
        assert_eq!(notes[1], "2 utterance(s), 5 word(s)");
        assert!(notes.iter().any(|n| n.ends_with("is 3.000s long")));
        assert!(notes.iter().any(|n| n == "Aligning 2 utterance(s) with stub"));
        assert!(notes.last().unwrap().starts_with("Wrote "));
        assert_eq!(
            *stages.lock().unwrap(),
            vec!["read", "dictionary", "engine", "merge", "write"]
        );
    }

    #[test]
    fn test_per_speaker_path() {
        assert_eq!(
            per_speaker_path(Path::new("/out/int.TextGrid"), "Mary Smith"),
            PathBuf::from("/out/int_Mary Smith.TextGrid")
        );
    }
}
