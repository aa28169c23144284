use std::process::{Command, ExitStatus, Output, Stdio};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::IterateError;
use crate::types::{CommandLine, RunResult};

/// Runs one command to completion and reports what happened.
///
/// Production code uses [`ProcessExecutor`]; tests can record calls instead of
/// spawning processes.
pub trait Execute {
    fn execute(&mut self, command: &CommandLine) -> Result<RunResult, IterateError>;
}

/// Spawns real child processes via [`timed_cmd_with_env`].
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    env: Vec<(String, String)>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable on every child this executor spawns.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl Execute for ProcessExecutor {
    fn execute(&mut self, command: &CommandLine) -> Result<RunResult, IterateError> {
        timed_cmd_with_env(command.clone(), &self.env)
    }
}

/// Run `cmd` synchronously, timing it and capturing its output.
///
/// A nonzero exit is data, not an error. Only a failure to launch the process
/// is returned as `Err`.
pub fn timed_cmd(cmd: impl Into<CommandLine>) -> Result<RunResult, IterateError> {
    timed_cmd_with_env(cmd, &[])
}

pub fn timed_cmd_with_env(
    cmd: impl Into<CommandLine>,
    env: &[(String, String)],
) -> Result<RunResult, IterateError> {
    let cmd = cmd.into();
    let program = match cmd.program() {
        Some(p) if !cmd.is_empty() => p,
        _ => return Err(IterateError::EmptyCommand),
    };
    debug!(command = ?cmd.tokens(), "starting to run command");

    let start = Utc::now();
    let clock = Instant::now();

    let output = Command::new(program)
        .args(cmd.args())
        .envs(env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::inherit())
        .output()
        .map_err(|source| IterateError::Spawn {
            command: cmd.to_string(),
            source,
        })?;

    let elapsed = clock.elapsed().as_secs_f64();
    let return_code = exit_code(output.status);
    let log = captured_lines(&output, return_code);

    info!(
        "Command {} took {} seconds to return status {}",
        cmd, elapsed, return_code
    );

    Ok(RunResult {
        start,
        log,
        return_code,
        elapsed,
    })
}

/// Lines recorded for a finished child: stdout alone on success, stdout
/// followed by stderr otherwise. On success stderr is still echoed to the log.
fn captured_lines(output: &Output, return_code: i32) -> Vec<String> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let text = if return_code == 0 {
        for line in stderr.lines() {
            info!("stderr: {}", line);
        }
        stdout.into_owned()
    } else {
        let mut text = stdout.into_owned();
        text.push_str(&stderr);
        text
    };

    split_lines(&text)
}

/// Split on `'\n'`, keeping the empty element after a trailing newline.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => -signal,
        (None, None) => -1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
