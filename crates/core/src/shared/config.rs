use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    APP_DIR_NAME, DEFAULT_UTTERANCE_TIMEOUT_SECS, DICTIONARY_FILE_NAME, DURATION_SCRIPT_NAME,
    MIN_UTTERANCE_DURATION,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine data directory for the acoustic model")]
    NoDataDir,
}

/// Locations of the external programs and model files used for alignment.
///
/// Every field is optional: a missing binary path means "look it up on
/// `PATH`", a missing model directory falls back to the per-user data dir.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub htk_tools_dir: Option<PathBuf>,
    pub sox_path: Option<PathBuf>,
    pub praat_path: Option<PathBuf>,
    pub praat_script_dir: Option<PathBuf>,
    pub model_dir: Option<PathBuf>,
}

impl ToolchainConfig {
    /// Load a toolchain description from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the per-user config file if it exists, otherwise return defaults.
    pub fn load_user() -> Result<Self, ConfigError> {
        match Self::user_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config_dir>/forced-align/config.json`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
    }

    /// Overlay `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merged_with(self, overrides: ToolchainConfig) -> Self {
        Self {
            htk_tools_dir: overrides.htk_tools_dir.or(self.htk_tools_dir),
            sox_path: overrides.sox_path.or(self.sox_path),
            praat_path: overrides.praat_path.or(self.praat_path),
            praat_script_dir: overrides.praat_script_dir.or(self.praat_script_dir),
            model_dir: overrides.model_dir.or(self.model_dir),
        }
    }

    pub fn hcopy(&self) -> PathBuf {
        self.htk_tool("HCopy")
    }

    pub fn hvite(&self) -> PathBuf {
        self.htk_tool("HVite")
    }

    pub fn sox(&self) -> PathBuf {
        self.sox_path.clone().unwrap_or_else(|| PathBuf::from("sox"))
    }

    pub fn praat(&self) -> PathBuf {
        self.praat_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("praat"))
    }

    /// Praat script that prints the duration of a sound file, when a
    /// script directory is configured. Without one the copy bundled with
    /// the library is used.
    pub fn duration_script(&self) -> Option<PathBuf> {
        self.praat_script_dir
            .as_ref()
            .map(|dir| dir.join(DURATION_SCRIPT_NAME))
    }

    /// Configured model directory, or `<data_dir>/forced-align/model`.
    pub fn model_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.model_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME).join("model"))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Dictionary shipped next to the acoustic model.
    pub fn default_dictionary(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.model_dir()?.join(DICTIONARY_FILE_NAME))
    }

    fn htk_tool(&self, name: &str) -> PathBuf {
        match &self.htk_tools_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// How merged alignments are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One TextGrid holding every speaker's tiers.
    Combined,
    /// One TextGrid per speaker.
    PerSpeaker,
}

/// What to do when transcript words are missing from the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownWordPolicy {
    /// Drop unknown words from the engine input and keep going.
    Continue,
    /// Stop before any alignment is attempted.
    Abort,
}

/// Run-wide settings for the aligner, passed explicitly to every stage.
#[derive(Debug, Clone)]
pub struct AlignerConfig {
    pub toolchain: ToolchainConfig,
    pub temp_dir: Option<PathBuf>,
    pub force: bool,
    pub no_prompt: bool,
    pub verbose: bool,
    pub jobs: usize,
    pub utterance_timeout: Duration,
    pub output_mode: OutputMode,
    pub unknown_words: UnknownWordPolicy,
    pub min_utterance_duration: f64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            toolchain: ToolchainConfig::default(),
            temp_dir: None,
            force: false,
            no_prompt: false,
            verbose: false,
            jobs: 1,
            utterance_timeout: Duration::from_secs(DEFAULT_UTTERANCE_TIMEOUT_SECS),
            output_mode: OutputMode::Combined,
            unknown_words: UnknownWordPolicy::Continue,
            min_utterance_duration: MIN_UTTERANCE_DURATION,
        }
    }
}
