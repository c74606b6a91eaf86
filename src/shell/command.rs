//! Process execution.
//!
//! Commands are run from an argv list, never through a shell, so package
//! names and paths are passed through without quoting concerns.

use crate::error::{InstallerError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// A process to run: program, arguments and execution options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessInvocation {
    /// Program name or path.
    pub program: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: BTreeMap<String, String>,

    /// Stream output to the terminal instead of capturing it.
    pub inherit_output: bool,
}

impl ProcessInvocation {
    /// Create an invocation for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Create an invocation from a full argv list (first element is the program).
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Self {
        let mut iter = argv.iter().map(|s| s.as_ref().to_string());
        let program = iter.next().unwrap_or_default();
        Self {
            program,
            args: iter.collect(),
            ..Default::default()
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Stream output to the terminal.
    pub fn inherit_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    /// Prefix the invocation with another program (e.g. `sudo`).
    pub fn wrapped_in(self, wrapper: &str) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: wrapper.to_string(),
            args,
            ..self
        }
    }

    /// The full argv, program first.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Human-readable command line.
    pub fn display(&self) -> String {
        self.argv().join(" ")
    }
}

/// Result of executing a process.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Captured output, stderr first, for relaying a failure verbatim.
    pub fn combined_output(&self) -> String {
        let mut out = self.stderr.trim_end().to_string();
        let stdout = self.stdout.trim_end();
        if !stdout.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(stdout);
        }
        out
    }
}

/// Execute a process and wait for it to finish.
///
/// Returns `Err(CommandFailed)` only when the process cannot be spawned; a
/// non-zero exit is reported through [`CommandResult::success`].
pub fn execute(invocation: &ProcessInvocation) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);

    if let Some(cwd) = &invocation.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &invocation.env {
        cmd.env(key, value);
    }

    if invocation.inherit_output {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    }
    cmd.stdin(Stdio::inherit());

    tracing::debug!("Executing: {}", invocation.display());

    let output = cmd.output().map_err(|e| {
        tracing::debug!("Failed to spawn {}: {}", invocation.program, e);
        InstallerError::CommandFailed {
            command: invocation.display(),
            code: None,
        }
    })?;

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Execute a process and return success/failure.
pub fn execute_check(invocation: &ProcessInvocation) -> bool {
    execute(invocation).map(|r| r.success).unwrap_or(false)
}
