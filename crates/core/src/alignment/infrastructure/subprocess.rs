use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::alignment::domain::alignment_error::AlignmentEngineError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const LOG_TAIL_LINES: usize = 5;

/// Run `command` to completion, with stdout and stderr going to `log_path`.
///
/// The child is killed once `timeout` has elapsed. Output goes to a file
/// rather than a pipe so a chatty tool cannot block on a full buffer while
/// we wait for it.
pub fn run_with_timeout(
    command: &mut Command,
    timeout: Duration,
    log_path: &Path,
) -> Result<(), AlignmentEngineError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let stdout = File::create(log_path).map_err(|e| io_error(log_path, e))?;
    let stderr = stdout.try_clone().map_err(|e| io_error(log_path, e))?;

    log::debug!("Running {command:?}");
    let mut child = command
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .map_err(|e| AlignmentEngineError::Spawn {
            program: program.clone(),
            source: e,
        })?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AlignmentEngineError::Timeout {
                    program,
                    seconds: timeout.as_secs(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(AlignmentEngineError::Spawn { program, source: e });
            }
        }
    };

    if !status.success() {
        return Err(AlignmentEngineError::NonZeroExit {
            program,
            status: status.to_string(),
            detail: log_tail(log_path),
        });
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> AlignmentEngineError {
    AlignmentEngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn log_tail(path: &Path) -> String {
    let contents = fs::read_to_string(path).unwrap_or_default();
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    lines[start..].join(" | ")
}
