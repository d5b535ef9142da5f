//! External process execution.
//!
//! The Go toolchain and git are reached only through [`CommandExecutor`], so
//! the pipeline can be driven by a stub in tests without either tool being
//! installed.

use crate::error::{GorocketError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::process::{Command, Output};

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs `cmd` with `args`, layering `env` on top of the inherited
    /// environment, and returns the captured output.
    ///
    /// A non-zero exit status is not an error at this level; callers inspect
    /// [`Output::status`] themselves.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gorocket::exec::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor::default();
    /// let output = executor.run("go", &["version"], &[])?;
    /// assert!(output.status.success());
    /// # Ok::<(), gorocket::error::GorocketError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[&str], env: &[(&str, &str)]) -> Result<Output>;
}

/// Executes commands on the host system, optionally inside a fixed directory.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor {
    working_dir: Option<Utf8PathBuf>,
}

impl SystemCommandExecutor {
    /// Creates an executor that runs every command inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }

    /// Returns the directory commands run in, if one was fixed.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.working_dir.as_deref()
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
        debug!("running {cmd} {}", args.join(" "));
        let mut command = Command::new(cmd);
        command.args(args);
        command.envs(env.iter().copied());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command.output().map_err(GorocketError::from)
    }
}

/// Returns trimmed stdout when the command succeeded, or trimmed stderr as
/// the error message otherwise.
pub(crate) fn checked_stdout(output: &Output) -> std::result::Result<String, String> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_owned())
    }
}
