use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use forced_align_core::alignment::infrastructure::htk_aligner::HtkAligner;
use forced_align_core::audio::infrastructure::fallback_duration_probe::FallbackDurationProbe;
use forced_align_core::audio::infrastructure::praat_duration_probe::PraatDurationProbe;
use forced_align_core::audio::infrastructure::wav_duration_probe::WavDurationProbe;
use forced_align_core::pipeline::aligner::{Aligner, AlignmentJob, CheckJob};
use forced_align_core::pipeline::alignment_executor::{
    AlignmentExecutor, SequentialAlignmentExecutor,
};
use forced_align_core::pipeline::infrastructure::threaded_alignment_executor::ThreadedAlignmentExecutor;
use forced_align_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use forced_align_core::pipeline::prompt::{NoPrompt, Prompter, StdinPrompter};
use forced_align_core::shared::config::{
    AlignerConfig, OutputMode, ToolchainConfig, UnknownWordPolicy,
};
use forced_align_core::shared::constants::{
    DEFAULT_UTTERANCE_TIMEOUT_SECS, MIN_UTTERANCE_DURATION, TEXTGRID_EXTENSION,
    TRANSCRIPT_EXTENSION,
};
use forced_align_core::textgrid::infrastructure::praat_textgrid_writer::PraatTextGridWriter;
use forced_align_core::transcript::infrastructure::tab_transcript_reader::TabTranscriptReader;

const HTK_TOOLS_ENV: &str = "HTKTOOLSPATH";

/// Forced alignment of transcribed speech recordings into Praat TextGrids.
#[derive(Parser)]
#[command(name = "forced-align", version)]
struct Cli {
    /// Sound file to align (the transcript when --check is given).
    soundfile: PathBuf,

    /// Tab-delimited transcript [default: soundfile with .txt].
    transcription: Option<PathBuf>,

    /// Output TextGrid [default: transcription with .TextGrid].
    outputfile: Option<PathBuf>,

    /// Only check the transcript; write unknown words to this file.
    #[arg(short = 'c', long, value_name = "UNKNOWN_WORDS")]
    check: Option<PathBuf>,

    /// Additional dictionary entries (WORD<TAB>PH PH, ALT).
    #[arg(short = 'i', long = "import", value_name = "FILE")]
    import: Option<PathBuf>,

    /// Pronunciation dictionary [default: <model-dir>/dict].
    #[arg(short = 'd', long)]
    dict: Option<PathBuf>,

    /// Directory containing HCopy and HVite.
    #[arg(short = 't', long)]
    htktoolspath: Option<PathBuf>,

    /// SoX executable.
    #[arg(long)]
    sox: Option<PathBuf>,

    /// Praat executable.
    #[arg(long)]
    praat: Option<PathBuf>,

    /// Directory containing get_duration.praat.
    #[arg(long)]
    praat_scripts: Option<PathBuf>,

    /// Acoustic model directory.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Scratch directory for intermediate files.
    #[arg(long)]
    tempdir: Option<PathBuf>,

    /// Overwrite existing output files.
    #[arg(short = 'f', long)]
    force: bool,

    /// Never ask questions; unknown words are left out.
    #[arg(short = 'n', long)]
    no_prompt: bool,

    /// Number of utterances aligned in parallel.
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,

    /// Per-utterance timeout for each external tool, in seconds.
    #[arg(long, default_value_t = DEFAULT_UTTERANCE_TIMEOUT_SECS)]
    timeout: u64,

    /// Write one TextGrid per speaker.
    #[arg(long)]
    per_speaker: bool,

    /// Stop before aligning when words are missing from the dictionary.
    #[arg(long)]
    abort_on_unknown: bool,

    /// Toolchain config file [default: <config_dir>/forced-align/config.json].
    #[arg(long)]
    config: Option<PathBuf>,

    /// More output (-v info, -vv debug).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(&cli)?;

    let config = build_config(&cli)?;
    let dictionary = match &cli.dict {
        Some(dict) => dict.clone(),
        None => config.toolchain.default_dictionary()?,
    };
    if !dictionary.exists() {
        return Err(format!("Dictionary not found: {}", dictionary.display()).into());
    }

    if let Some(unknown_words) = &cli.check {
        let job = CheckJob {
            transcript: cli.soundfile.clone(),
            dictionary,
            import: cli.import.clone(),
            unknown_words: unknown_words.clone(),
        };
        let mut aligner = build_aligner(config)?;
        let check = aligner.check_only(&job)?;
        if check.is_ok() {
            log::info!("All words found in the dictionary");
        } else {
            eprintln!(
                "{} unknown word(s) written to {}",
                check.missing.len(),
                unknown_words.display()
            );
        }
        return Ok(());
    }

    let transcript = transcript_path(&cli);
    let job = AlignmentJob {
        audio: cli.soundfile.clone(),
        output: output_path(&cli, &transcript),
        transcript,
        dictionary,
        import: cli.import.clone(),
    };
    let mut aligner = build_aligner(config)?;
    let summary = aligner.align(&job)?;

    for output in &summary.outputs {
        log::info!("Output written to {}", output.display());
    }
    if !summary.failures.is_empty() {
        eprintln!(
            "{} utterance(s) could not be aligned, see the .errorlog file",
            summary.failures.len()
        );
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<AlignerConfig, Box<dyn std::error::Error>> {
    let file_config = match &cli.config {
        Some(path) => ToolchainConfig::load(path)?,
        None => ToolchainConfig::load_user()?,
    };
    let env_config = ToolchainConfig {
        htk_tools_dir: std::env::var_os(HTK_TOOLS_ENV).map(PathBuf::from),
        ..Default::default()
    };
    let cli_config = ToolchainConfig {
        htk_tools_dir: cli.htktoolspath.clone(),
        sox_path: cli.sox.clone(),
        praat_path: cli.praat.clone(),
        praat_script_dir: cli.praat_scripts.clone(),
        model_dir: cli.model_dir.clone(),
    };

    Ok(AlignerConfig {
        toolchain: file_config.merged_with(env_config).merged_with(cli_config),
        temp_dir: cli.tempdir.clone(),
        force: cli.force,
        no_prompt: cli.no_prompt,
        verbose: cli.verbose > 0,
        jobs: cli.jobs,
        utterance_timeout: Duration::from_secs(cli.timeout),
        output_mode: if cli.per_speaker {
            OutputMode::PerSpeaker
        } else {
            OutputMode::Combined
        },
        unknown_words: if cli.abort_on_unknown {
            UnknownWordPolicy::Abort
        } else {
            UnknownWordPolicy::Continue
        },
        min_utterance_duration: MIN_UTTERANCE_DURATION,
    })
}

fn build_aligner(config: AlignerConfig) -> Result<Aligner, Box<dyn std::error::Error>> {
    let toolchain = config.toolchain.clone();
    let timeout = config.utterance_timeout;

    let engine = Arc::new(HtkAligner::new(&toolchain, timeout)?);
    let probe = FallbackDurationProbe::new(
        Box::new(WavDurationProbe::new()),
        Box::new(PraatDurationProbe::new(&toolchain, timeout)),
    );
    let executor: Box<dyn AlignmentExecutor> = if config.jobs > 1 {
        Box::new(ThreadedAlignmentExecutor::new(config.jobs))
    } else {
        Box::new(SequentialAlignmentExecutor)
    };
    let prompter: Box<dyn Prompter> = if config.no_prompt {
        Box::new(NoPrompt)
    } else {
        Box::new(StdinPrompter::stdio())
    };
    let writer = PraatTextGridWriter::new(config.force);

    Ok(Aligner::new(
        config,
        Box::new(TabTranscriptReader::new()),
        engine,
        Box::new(probe),
        Box::new(writer),
        executor,
        prompter,
        Box::new(StdoutPipelineLogger::default()),
    ))
}

fn transcript_path(cli: &Cli) -> PathBuf {
    cli.transcription
        .clone()
        .unwrap_or_else(|| cli.soundfile.with_extension(TRANSCRIPT_EXTENSION))
}

fn output_path(cli: &Cli, transcript: &Path) -> PathBuf {
    cli.outputfile
        .clone()
        .unwrap_or_else(|| transcript.with_extension(TEXTGRID_EXTENSION))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.soundfile.exists() {
        let kind = if cli.check.is_some() {
            "Transcript"
        } else {
            "Sound file"
        };
        return Err(format!("{kind} not found: {}", cli.soundfile.display()).into());
    }
    if cli.check.is_none() {
        let transcript = transcript_path(cli);
        if !transcript.exists() {
            return Err(format!("Transcript not found: {}", transcript.display()).into());
        }
    }
    if let Some(import) = &cli.import {
        if !import.exists() {
            return Err(format!("Import file not found: {}", import.display()).into());
        }
    }
    if let Some(dir) = &cli.tempdir {
        if !dir.is_dir() {
            return Err(format!("Scratch directory not found: {}", dir.display()).into());
        }
    }
    if cli.jobs == 0 {
        return Err("Jobs must be at least 1".into());
    }
    if cli.timeout == 0 {
        return Err("Timeout must be at least 1 second".into());
    }
    Ok(())
}
