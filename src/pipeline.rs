//! Build and release orchestration.
//!
//! This module wires the stages together: configuration, build info, target
//! expansion, compilation, packaging, formula generation and release
//! reconciliation. Every stage runs sequentially and any reported failure
//! aborts the stages after it.

use crate::artefact::archiver::{ArchiveResult, Archiver};
use crate::build_info::BuildInfo;
use crate::compiler::{BuildResult, CrossCompiler};
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::{GorocketError, Result};
use crate::exec::CommandExecutor;
use crate::formula::{FormulaGenerator, formula_file_name};
use crate::github::ReleaseHost;
use crate::output::write_line;
use crate::release::{ReleaseOutcome, ReleaseReconciler, ReleaseRequest};
use crate::repository::{RemoteRepository, RepositoryResolver};
use crate::target::{ConcreteTarget, expand_targets};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::Write;

/// Default output directory name under the project root.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Where the project lives and where its artefacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root holding `go.mod` and the configuration file.
    pub root: Utf8PathBuf,
    /// Output directory for archives and the formula.
    pub dist_dir: Utf8PathBuf,
}

impl ProjectLayout {
    /// Layout with the output directory at `{root}/dist`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        let root = root.into();
        let dist_dir = root.join(DEFAULT_DIST_DIR);
        Self { root, dist_dir }
    }

    /// Overrides the output directory.
    #[must_use]
    pub fn with_dist_dir(mut self, dist_dir: impl Into<Utf8PathBuf>) -> Self {
        self.dist_dir = dist_dir.into();
        self
    }

    /// Path of the project configuration file.
    #[must_use]
    pub fn config_path(&self) -> Utf8PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }
}

/// Readies the output directory for a fresh build.
///
/// With `clean` an existing directory is removed first; without it a
/// non-empty directory is refused. The directory exists afterwards.
///
/// # Errors
///
/// Returns [`GorocketError::DistNotEmpty`] when the directory holds files
/// and `clean` is false, or an I/O error if it cannot be removed or created.
pub fn prepare_dist_dir(dir: &Utf8Path, clean: bool) -> Result<()> {
    if dir.exists() {
        if clean {
            debug!("removing {dir}");
            std::fs::remove_dir_all(dir)?;
        } else if dir.read_dir_utf8()?.next().is_some() {
            return Err(GorocketError::DistNotEmpty {
                path: dir.to_owned(),
            });
        }
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Module and version that were built.
    pub info: BuildInfo,
    /// Archives written, in target order.
    pub archives: Vec<Utf8PathBuf>,
    /// Formula written, when a Homebrew section is configured.
    pub formula: Option<Utf8PathBuf>,
    /// Repository the formula download URLs point at.
    pub repository: Option<RemoteRepository>,
    /// Tap repository from the configuration.
    pub tap: Option<RemoteRepository>,
}

/// Runs the build and release stages for one project.
pub struct Pipeline<'a> {
    layout: ProjectLayout,
    executor: &'a dyn CommandExecutor,
    repository_override: Option<String>,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline running external commands through `executor`.
    #[must_use]
    pub fn new(layout: ProjectLayout, executor: &'a dyn CommandExecutor) -> Self {
        Self {
            layout,
            executor,
            repository_override: None,
        }
    }

    /// Uses `owner/name` instead of the `origin` remote.
    #[must_use]
    pub fn with_repository_override(mut self, value: Option<String>) -> Self {
        self.repository_override = value;
        self
    }

    /// Compiles, packages and (when configured) renders the formula.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, build info or output directory
    /// error; [`GorocketError::CompilationFailed`] or
    /// [`GorocketError::PackagingFailed`] naming every failed target; or a
    /// repository or formula error.
    pub fn build(&self, clean: bool, progress: &mut dyn Write) -> Result<BuildReport> {
        let config_path = self.layout.config_path();
        if !config_path.exists() {
            return Err(GorocketError::ConfigNotFound { path: config_path });
        }
        let info = BuildInfo::detect(&self.layout.root, self.executor)?;
        let config = Config::load(&config_path, &info)?;
        prepare_dist_dir(&self.layout.dist_dir, clean)?;

        write_line(
            progress,
            format!("Building {} version {}", info.module_name, info.version),
        );
        let targets = expand_targets(&config.build.targets);
        info!("building {} target(s)", targets.len());

        let builds = self.compile(&info, &targets, &config.build.ldflags, progress)?;
        let binaries: BTreeSet<Utf8PathBuf> = builds
            .iter()
            .filter_map(|build| build.binary_path().map(Utf8Path::to_owned))
            .collect();
        let archived = Archiver::new(&self.layout.dist_dir).create_archives(&info, builds);
        let archives = collect_archives(&archived, progress)?;
        remove_binaries(&binaries)?;

        let (formula, repository) = match config.tap() {
            Some(_) => {
                let repo = self.resolve_repository()?;
                write_line(progress, "Generating Homebrew formula...");
                let text = FormulaGenerator.generate(&info, &archived, &repo)?;
                let name = formula_file_name(&info.module_name);
                let path = self.layout.dist_dir.join(&name);
                std::fs::write(&path, text)?;
                write_line(progress, format!("Created {name}"));
                (Some(path), Some(repo))
            }
            None => (None, None),
        };

        write_line(progress, "Build completed successfully!");
        Ok(BuildReport {
            info,
            archives,
            formula,
            repository,
            tap: config.tap().cloned(),
        })
    }

    /// Builds, then publishes the output directory as a release.
    ///
    /// # Errors
    ///
    /// Returns any [`Self::build`] error, a repository resolution error, or
    /// the release error of the first failing remote stage.
    pub fn release(
        &self,
        host: &dyn ReleaseHost,
        clean: bool,
        draft: bool,
        progress: &mut dyn Write,
    ) -> Result<ReleaseOutcome> {
        let report = self.build(clean, progress)?;
        let repo = match report.repository {
            Some(repo) => repo,
            None => self.resolve_repository()?,
        };
        let request = ReleaseRequest {
            info: &report.info,
            repo: &repo,
            dist_dir: &self.layout.dist_dir,
            draft,
            tap: report.tap.as_ref(),
        };

        let outcome = ReleaseReconciler::new(host).release(&request, progress)?;
        write_line(progress, format!("Release URL: {}", outcome.release.html_url));
        for name in &outcome.uploaded {
            write_line(progress, format!("  - {name}"));
        }
        Ok(outcome)
    }

    fn resolve_repository(&self) -> Result<RemoteRepository> {
        RepositoryResolver::new(self.executor, self.repository_override.clone()).resolve()
    }

    fn compile(
        &self,
        info: &BuildInfo,
        targets: &[ConcreteTarget],
        ldflags: &str,
        progress: &mut dyn Write,
    ) -> Result<Vec<BuildResult>> {
        let results = CrossCompiler::new(self.executor, &self.layout.dist_dir)
            .build_targets(info, targets, ldflags);

        let mut failures = Vec::new();
        for result in &results {
            match result.error() {
                None => write_line(progress, format!("Built {}", result.target)),
                Some(err) => {
                    write_line(progress, format!("Failed {}: {err}", result.target));
                    failures.push(failure_entry(&result.target, err));
                }
            }
        }
        if failures.is_empty() {
            Ok(results)
        } else {
            Err(GorocketError::CompilationFailed {
                count: failures.len(),
                summary: failures.join("; "),
            })
        }
    }
}

fn failure_entry(target: &ConcreteTarget, reason: impl Display) -> String {
    format!("{target}: {reason}")
}

fn collect_archives(
    archived: &[ArchiveResult],
    progress: &mut dyn Write,
) -> Result<Vec<Utf8PathBuf>> {
    let mut archives = Vec::with_capacity(archived.len());
    let mut failures = Vec::new();
    for result in archived {
        match &result.outcome {
            Ok(path) => {
                let name = path.file_name().unwrap_or(path.as_str());
                write_line(progress, format!("Created {name}"));
                archives.push(path.clone());
            }
            Err(err) => failures.push(failure_entry(&result.target, err)),
        }
    }
    if failures.is_empty() {
        Ok(archives)
    } else {
        Err(GorocketError::PackagingFailed {
            count: failures.len(),
            summary: failures.join("; "),
        })
    }
}

/// Deletes each compiled binary once; a repeated target shares one path.
fn remove_binaries(binaries: &BTreeSet<Utf8PathBuf>) -> Result<()> {
    for binary in binaries {
        debug!("removing {binary}");
        std::fs::remove_file(binary)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
