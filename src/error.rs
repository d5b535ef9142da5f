//! Error types for the gorocket release pipeline.
//!
//! Every variant names the stage that failed so the terminal message tells
//! the user where the pipeline stopped. Stage-local errors (compilation,
//! packaging, formula rendering, remote API) are defined next to the code
//! that raises them and wrapped here.

use crate::formula::FormulaError;
use crate::github::HostError;
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// Remote operation that was in flight when a release failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
    /// Looking up an existing release by tag.
    Lookup,
    /// Creating the release object.
    Create,
    /// Uploading an asset to the release.
    Upload,
    /// Reading the current formula from the tap repository.
    TapLookup,
    /// Writing the formula into the tap repository.
    TapUpdate,
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Lookup => "lookup",
            Self::Create => "creation",
            Self::Upload => "asset upload",
            Self::TapLookup => "tap lookup",
            Self::TapUpdate => "tap update",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while building or publishing a release.
#[derive(Debug, Error)]
pub enum GorocketError {
    /// The project has no configuration file.
    #[error("{} not found. Run 'gorocket init' first", path)]
    ConfigNotFound {
        /// Path where the configuration was expected.
        path: Utf8PathBuf,
    },

    /// `init` refused to overwrite an existing configuration.
    #[error("{path} already exists")]
    ConfigExists {
        /// Path of the existing configuration.
        path: Utf8PathBuf,
    },

    /// The configuration could not be rendered, decoded or validated.
    #[error("invalid configuration in {path}: {reason}")]
    InvalidConfig {
        /// Path of the offending configuration.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The Go module name could not be determined.
    #[error("failed to read module name from {path}: {reason}")]
    GoModule {
        /// Path to the `go.mod` file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A git invocation failed.
    #[error("git {operation} failed: {message}")]
    Git {
        /// The git operation that failed.
        operation: &'static str,
        /// Diagnostic output from git.
        message: String,
    },

    /// The `origin` remote is not a recognised GitHub URL.
    #[error("invalid GitHub repository URL: {url}")]
    InvalidRepositoryUrl {
        /// The URL that could not be parsed.
        url: String,
    },

    /// The repository override is not of the form `owner/name`.
    #[error("invalid repository override {value:?}: expected owner/name")]
    InvalidRepositoryOverride {
        /// The rejected override value.
        value: String,
    },

    /// The output directory holds files from a previous run.
    #[error("output directory {path} is not empty; pass --clean to rebuild")]
    DistNotEmpty {
        /// Path to the output directory.
        path: Utf8PathBuf,
    },

    /// One or more targets failed to compile.
    #[error("{count} target(s) failed to build: {summary}")]
    CompilationFailed {
        /// Number of failed targets.
        count: usize,
        /// One `os/arch: reason` entry per failure.
        summary: String,
    },

    /// One or more archives could not be written.
    #[error("{count} archive(s) could not be created: {summary}")]
    PackagingFailed {
        /// Number of failed archives.
        count: usize,
        /// One `os/arch: reason` entry per failure.
        summary: String,
    },

    /// The Homebrew formula could not be produced.
    #[error("formula generation failed: {0}")]
    Formula(#[from] FormulaError),

    /// A remote API call failed.
    #[error("release {stage} failed: {source}")]
    Release {
        /// The stage that was running.
        stage: ReleaseStage,
        /// The underlying API error.
        #[source]
        source: HostError,
    },

    /// No API token was supplied for publishing.
    #[error("a GitHub token is required: pass --github-token or set GITHUB_TOKEN")]
    MissingToken,

    /// A path could not be represented as UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`GorocketError`].
pub type Result<T> = std::result::Result<T, GorocketError>;
