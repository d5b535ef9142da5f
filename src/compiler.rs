//! Cross-compilation through the Go toolchain.
//!
//! Each concrete target is built with one `go build` invocation whose
//! `GOOS`/`GOARCH` are layered over the inherited environment. Failures are
//! recorded per target; a batch never aborts early.

use crate::build_info::BuildInfo;
use crate::exec::CommandExecutor;
use crate::target::ConcreteTarget;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use thiserror::Error;

/// Why a single target failed to compile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// `go build` exited unsuccessfully.
    #[error("failed to build target {target}: {diagnostics}")]
    Toolchain {
        /// The target being built.
        target: ConcreteTarget,
        /// Captured stderr from the toolchain.
        diagnostics: String,
    },

    /// The toolchain could not be started.
    #[error("failed to run go for target {target}: {reason}")]
    Spawn {
        /// The target being built.
        target: ConcreteTarget,
        /// Description of the spawn failure.
        reason: String,
    },
}

/// Outcome of compiling one target.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// The target that was built.
    pub target: ConcreteTarget,
    /// Path to the produced binary, or the reason there is none.
    pub outcome: Result<Utf8PathBuf, BuildError>,
}

impl BuildResult {
    /// Path to the binary when the build succeeded.
    #[must_use]
    pub fn binary_path(&self) -> Option<&Utf8Path> {
        self.outcome.as_ref().ok().map(Utf8PathBuf::as_path)
    }

    /// The failure when the build did not succeed.
    #[must_use]
    pub fn error(&self) -> Option<&BuildError> {
        self.outcome.as_ref().err()
    }
}

/// File name of the intermediate binary for `target`.
///
/// Every target gets a distinct name so a whole batch can share one output
/// directory.
///
/// # Examples
///
/// ```
/// use gorocket::build_info::BuildInfo;
/// use gorocket::compiler::binary_name;
/// use gorocket::target::ConcreteTarget;
///
/// let info = BuildInfo::new("rocket", "v1.0.0");
/// let name = binary_name(&info, &ConcreteTarget::new("windows", "amd64"));
/// assert_eq!(name, "rocket_v1.0.0_windows_amd64.exe");
/// ```
#[must_use]
pub fn binary_name(info: &BuildInfo, target: &ConcreteTarget) -> String {
    format!(
        "{}_{}_{}_{}{}",
        info.module_name,
        info.version,
        target.os,
        target.arch,
        target.exe_suffix()
    )
}

/// Invokes `go build` once per target.
pub struct CrossCompiler<'a> {
    executor: &'a dyn CommandExecutor,
    output_dir: Utf8PathBuf,
}

impl<'a> CrossCompiler<'a> {
    /// Creates a compiler writing binaries into `output_dir`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            executor,
            output_dir: output_dir.into(),
        }
    }

    /// Builds one target. Build flags are passed verbatim when non-empty.
    #[must_use]
    pub fn build(&self, info: &BuildInfo, target: &ConcreteTarget, ldflags: &str) -> BuildResult {
        let binary_path = self.output_dir.join(binary_name(info, target));
        info!("building {} for {target}", info.module_name);

        let mut args = vec!["build", "-o", binary_path.as_str()];
        if !ldflags.is_empty() {
            args.extend(["-ldflags", ldflags]);
        }
        args.push(".");
        let env = [("GOOS", target.os.as_str()), ("GOARCH", target.arch.as_str())];

        let outcome = match self.executor.run("go", &args, &env) {
            Ok(output) if output.status.success() => {
                debug!("built {binary_path}");
                Ok(binary_path)
            }
            Ok(output) => Err(BuildError::Toolchain {
                target: target.clone(),
                diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            }),
            Err(err) => Err(BuildError::Spawn {
                target: target.clone(),
                reason: err.to_string(),
            }),
        };

        BuildResult {
            target: target.clone(),
            outcome,
        }
    }

    /// Builds every target in order and returns one result per target.
    ///
    /// Individual failures are recorded in the results and never stop the
    /// batch.
    #[must_use]
    pub fn build_targets(
        &self,
        info: &BuildInfo,
        targets: &[ConcreteTarget],
        ldflags: &str,
    ) -> Vec<BuildResult> {
        targets
            .iter()
            .map(|target| self.build(info, target, ldflags))
            .collect()
    }
}
