//! Child process execution.
//!
//! # Responsibilities
//! - Spawn external tools with an explicit environment and working directory
//! - Bound every child with a deadline
//! - Capture stdout/stderr for diagnostics
//!
//! # Design Decisions
//! - The parent environment is inherited but never modified; per-tool
//!   variables (e.g. `FIFTPATH`) are set on the child only
//! - stdin is closed so a tool waiting for input fails instead of hanging

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::resilience::with_deadline;
use crate::tools::types::ToolError;

/// Characters of stderr kept in error messages.
const STDERR_TAIL: usize = 512;

/// A fully described child process invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    env: Vec<(String, OsString)>,
    current_dir: Option<PathBuf>,
    inherit_stdout: bool,
}

/// What a finished child left behind.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Last few hundred characters of stderr, for error messages.
    pub fn stderr_tail(&self) -> String {
        let trimmed = self.stderr.trim();
        let start = trimmed
            .char_indices()
            .rev()
            .nth(STDERR_TAIL - 1)
            .map_or(0, |(i, _)| i);
        trimmed[start..].to_string()
    }
}

impl ToolCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            current_dir: None,
            inherit_stdout: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: &str, value: impl Into<OsString>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Let the child draw directly on the terminal.
    pub fn inherit_stdout(mut self) -> Self {
        self.inherit_stdout = true;
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Human-readable command line for logs.
    pub fn display(&self) -> String {
        let mut line = self.program_name();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run to completion within `limit`.
    ///
    /// Only spawn failures and timeouts are errors here; interpreting the
    /// exit status is up to the caller.
    pub async fn run(&self, limit: Duration) -> Result<ToolOutput, ToolError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if self.inherit_stdout {
            command.stdout(Stdio::inherit());
        } else {
            command.stdout(Stdio::piped());
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        tracing::debug!(
            command = %self.display(),
            cwd = ?self.current_dir,
            "Spawning external tool"
        );

        let program = self.program_name();
        let output = with_deadline(&program, limit, command.output())
            .await
            .map_err(|e| ToolError::Timeout {
                program: program.clone(),
                secs: e.limit.as_secs(),
            })?
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            program = %program,
            status = %output.status,
            "External tool finished"
        );

        Ok(output)
    }

    /// Run and require a zero exit status.
    pub async fn run_checked(&self, limit: Duration) -> Result<ToolOutput, ToolError> {
        let output = self.run(limit).await?;
        if !output.success() {
            return Err(ToolError::ExitStatus {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: output.stderr_tail(),
            });
        }
        Ok(output)
    }
}

/// Make a path independent of the working directory the child runs in.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Absolutize a program only when it is a path; bare names go through `PATH`.
pub fn absolutize_program(program: &str) -> io::Result<PathBuf> {
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        absolutize(Path::new(program))
    } else {
        Ok(PathBuf::from(program))
    }
}
