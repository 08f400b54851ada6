use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::mlf::{format_label_file, parse_aligned};
use super::subprocess::run_with_timeout;
use crate::alignment::domain::alignment_error::AlignmentEngineError;
use crate::alignment::domain::utterance_aligner::{
    AlignmentRequest, UtteranceAligner, UtteranceAlignment,
};
use crate::shared::config::{ConfigError, ToolchainConfig};
use crate::shared::constants::MODEL_SAMPLE_RATE;

/// Aligns utterances with the HTK toolkit: `sox` cuts and resamples the
/// window, `HCopy` extracts features, `HVite` does the Viterbi alignment.
pub struct HtkAligner {
    sox: PathBuf,
    hcopy: PathBuf,
    hvite: PathBuf,
    model_dir: PathBuf,
    timeout: Duration,
}

impl HtkAligner {
    pub fn new(toolchain: &ToolchainConfig, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            sox: toolchain.sox(),
            hcopy: toolchain.hcopy(),
            hvite: toolchain.hvite(),
            model_dir: toolchain.model_dir()?,
            timeout,
        })
    }

    fn model_file(&self, name: &str) -> PathBuf {
        self.model_dir
            .join(MODEL_SAMPLE_RATE.to_string())
            .join(name)
    }

    fn cut_command(&self, request: &AlignmentRequest, chunk: &Path) -> Command {
        let mut cmd = Command::new(&self.sox);
        cmd.arg(&request.audio)
            .args(["-c", "1", "-r"])
            .arg(MODEL_SAMPLE_RATE.to_string())
            .arg(chunk)
            .arg("trim")
            .arg(format!("{:.3}", request.start))
            .arg(format!("{:.3}", request.duration));
        cmd
    }

    fn feature_command(&self, script: &Path) -> Command {
        let mut cmd = Command::new(&self.hcopy);
        cmd.args(["-T", "1", "-C"])
            .arg(self.model_file("config"))
            .arg("-S")
            .arg(script);
        cmd
    }

    fn viterbi_command(
        &self,
        request: &AlignmentRequest,
        labels: &Path,
        script: &Path,
        aligned: &Path,
    ) -> Command {
        let mut cmd = Command::new(&self.hvite);
        cmd.args(["-T", "1", "-a", "-m", "-t", "10000.0", "10000.0", "100000.0"])
            .arg("-I")
            .arg(labels)
            .arg("-H")
            .arg(self.model_file("macros"))
            .arg("-H")
            .arg(self.model_file("hmmdefs"))
            .arg("-S")
            .arg(script)
            .arg("-i")
            .arg(aligned)
            .args(["-p", "0.0", "-s", "5.0"])
            .arg(&request.dictionary)
            .arg(self.model_dir.join("monophones"));
        cmd
    }
}

impl UtteranceAligner for HtkAligner {
    fn name(&self) -> &str {
        "htk"
    }

    fn align(&self, request: &AlignmentRequest) -> Result<UtteranceAlignment, AlignmentEngineError> {
        let scratch = &request.scratch_dir;
        let id = &request.identifier;
        let chunk = scratch.join(format!("{id}.wav"));
        let features = scratch.join(format!("{id}.plp"));
        let labels = scratch.join("tmp.mlf");
        let aligned = scratch.join("aligned.mlf");
        let codetr = scratch.join("codetr.scp");
        let test = scratch.join("test.scp");

        run_with_timeout(
            &mut self.cut_command(request, &chunk),
            self.timeout,
            &scratch.join("sox.log"),
        )?;

        write_scratch(&labels, &format_label_file(id, &request.words))?;
        write_scratch(
            &codetr,
            &format!("{} {}\n", chunk.display(), features.display()),
        )?;
        write_scratch(&test, &format!("{}\n", features.display()))?;

        run_with_timeout(
            &mut self.feature_command(&codetr),
            self.timeout,
            &scratch.join("hcopy.log"),
        )?;
        run_with_timeout(
            &mut self.viterbi_command(request, &labels, &test, &aligned),
            self.timeout,
            &scratch.join("hvite.log"),
        )?;

        let output = fs::read_to_string(&aligned).map_err(|e| AlignmentEngineError::Io {
            path: aligned.clone(),
            source: e,
        })?;
        let alignment = parse_aligned(&output)?;
        log::debug!(
            "{id}: {} phones, {} words aligned",
            alignment.phones.len(),
            alignment.words.len()
        );
        Ok(alignment)
    }
}

fn write_scratch(path: &Path, contents: &str) -> Result<(), AlignmentEngineError> {
    fs::write(path, contents).map_err(|e| AlignmentEngineError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
