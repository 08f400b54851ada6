use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;

use crate::alignment::infrastructure::subprocess::run_with_timeout;
use crate::audio::domain::audio_error::AudioError;
use crate::audio::domain::duration_probe::DurationProbe;
use crate::shared::config::ToolchainConfig;
use crate::shared::constants::DURATION_SCRIPT_NAME;
use crate::shared::time::round_ms;

/// `scripts/get_duration.praat`, written out when no script directory is set.
pub const BUNDLED_DURATION_SCRIPT: &str = include_str!("../../../scripts/get_duration.praat");

/// Asks Praat for the duration, via a script that prints it on stdout.
/// Handles any format Praat can open.
pub struct PraatDurationProbe {
    praat: PathBuf,
    script: Option<PathBuf>,
    timeout: Duration,
}

impl PraatDurationProbe {
    pub fn new(toolchain: &ToolchainConfig, timeout: Duration) -> Self {
        Self {
            praat: toolchain.praat(),
            script: toolchain.duration_script(),
            timeout,
        }
    }

    /// The configured script, or the bundled one written into `scratch`.
    fn script_in(&self, scratch: &Path) -> std::io::Result<PathBuf> {
        if let Some(script) = &self.script {
            return Ok(script.clone());
        }
        let path = scratch.join(DURATION_SCRIPT_NAME);
        fs::write(&path, BUNDLED_DURATION_SCRIPT)?;
        Ok(path)
    }

    fn command(&self, script: &Path, audio: &Path) -> Command {
        let mut cmd = Command::new(&self.praat);
        cmd.arg("--run").arg(script).arg(audio);
        cmd
    }
}

impl DurationProbe for PraatDurationProbe {
    fn duration(&self, audio: &Path) -> Result<f64, AudioError> {
        let probe_error = |reason: String| AudioError::Probe {
            program: self.praat.display().to_string(),
            path: audio.to_path_buf(),
            reason,
        };
        let scratch = TempDir::new().map_err(|e| probe_error(e.to_string()))?;
        let output = scratch.path().join("praat.out");
        let script = self
            .script_in(scratch.path())
            .map_err(|e| probe_error(e.to_string()))?;

        run_with_timeout(&mut self.command(&script, audio), self.timeout, &output)
            .map_err(|e| probe_error(e.to_string()))?;
        let stdout = fs::read_to_string(&output).map_err(|e| probe_error(e.to_string()))?;
        parse_duration_output(&stdout)
    }
}

/// First number on the first non-empty line, e.g. `12.3456 seconds`.
pub fn parse_duration_output(stdout: &str) -> Result<f64, AudioError> {
    let unparsable = || AudioError::UnparsableDuration(stdout.trim().to_string());
    let token = stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split_whitespace().next())
        .ok_or_else(unparsable)?;
    let seconds: f64 = token.parse().map_err(|_| unparsable())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(unparsable());
    }
    Ok(round_ms(seconds))
}
