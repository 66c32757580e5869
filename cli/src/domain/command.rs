//! External command descriptions and their captured results.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Privilege-escalation wrapper prepended to commands that mutate the host.
pub const SUDO: &str = "sudo";

/// How a command's output is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capture {
    /// stdout/stderr are collected and returned to the caller.
    Buffered,
    /// stdout/stderr are inherited from the operator's console.
    Streamed,
}

/// One external command: program, arguments and optional stdin payload.
///
/// Commands are assembled from static templates and local paths only; there
/// is no shell in between, so no argument is ever re-parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
    /// Working directory; `None` inherits the process's.
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Build a command that runs through `sudo` when `use_sudo` is set.
    pub fn privileged<I, S>(use_sudo: bool, program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !use_sudo {
            return Self::new(program, args);
        }
        let mut all = vec![program.to_owned()];
        all.extend(args.into_iter().map(Into::into));
        Self::new(SUDO, all)
    }

    #[must_use]
    pub fn with_stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// `true` when the command is wrapped in `sudo`.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.program == SUDO
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        if self.stdin.is_some() {
            f.write_str(" < (stdin)")?;
        }
        Ok(())
    }
}

/// Exit code plus decoded output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// `true` when the command reported that its target does not exist.
    #[must_use]
    pub fn reports_missing(&self) -> bool {
        self.stderr.contains("No such file or directory")
    }
}
