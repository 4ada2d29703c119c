//! Forwarding resolved paths to a child process.
//!
//! Paths are handed to the child through `Command::arg`, one argv element
//! each. Nothing here ever builds a command line string or goes through a
//! shell, so a file called `$(rm -rf ~)` is just a file name.

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::DispatchError;
use crate::resolve::ResolvedList;

/// Replaced by the path in per-path mode.
pub const PLACEHOLDER: &str = "{}";

/// Exit code reported when a child neither exits normally nor by a signal.
const UNKNOWN_EXIT: i32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Run once with every path appended
    #[default]
    Batch,
    /// Run once per path
    PerPath,
}

/// Program plus the arguments placed before (or around) the paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn has_placeholder(&self) -> bool {
        self.args.iter().any(|a| a.contains(PLACEHOLDER))
    }

    /// Arguments for a single path.
    ///
    /// Every `{}` is substituted in place; without any `{}` the path is
    /// appended. Either way the path never spills into a neighbouring
    /// argument.
    pub fn args_for_path(&self, path: &str) -> Vec<String> {
        if self.has_placeholder() {
            self.args
                .iter()
                .map(|a| a.replace(PLACEHOLDER, path))
                .collect()
        } else {
            let mut args = self.args.clone();
            args.push(path.to_string());
            args
        }
    }

    /// Arguments for a batch run: template arguments first, then every path.
    pub fn args_for_batch(&self, paths: &[String]) -> Vec<String> {
        self.args.iter().chain(paths).cloned().collect()
    }
}

/// Maps a finished child to the code `globrun` should exit with.
///
/// A child killed by a signal maps to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    UNKNOWN_EXIT
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    template: CommandTemplate,
    mode: DispatchMode,
    current_dir: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(template: CommandTemplate, mode: DispatchMode) -> Self {
        Self {
            template,
            mode,
            current_dir: None,
        }
    }

    /// Runs the child from `dir`, so relative matches resolve the same way
    /// they did during matching.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Runs the template against `resolved` and returns the exit code.
    ///
    /// Per-path mode runs every path in order even after a failure; the
    /// first non-zero code is the one reported. An empty list runs nothing.
    pub fn dispatch(&self, resolved: &ResolvedList) -> Result<i32, DispatchError> {
        if resolved.is_empty() {
            log::debug!("Nothing to dispatch to `{}`", self.template.program());
            return Ok(0);
        }

        match self.mode {
            DispatchMode::Batch => self.run(&self.template.args_for_batch(resolved.paths())),
            DispatchMode::PerPath => {
                let mut first_failure = None;
                for path in resolved.paths() {
                    let code = self.run(&self.template.args_for_path(path))?;
                    if code != 0 && first_failure.is_none() {
                        first_failure = Some(code);
                    }
                }
                Ok(first_failure.unwrap_or(0))
            }
        }
    }

    fn run(&self, args: &[String]) -> Result<i32, DispatchError> {
        let program = self.template.program();
        log::debug!("Running `{}` with {} argument(s)", program, args.len());

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| DispatchError::Spawn {
            program: program.to_string(),
            source,
        })?;
        let status = child.wait().map_err(|source| DispatchError::Wait {
            program: program.to_string(),
            source,
        })?;

        let code = exit_code(status);
        if code != 0 {
            log::debug!("`{}` exited with {}", program, code);
        }
        Ok(code)
    }
}
