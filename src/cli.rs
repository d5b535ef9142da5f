//! CLI argument definitions for gorocket.
//!
//! Kept apart from the entrypoint so parsing can be tested without running
//! any pipeline stage.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Build, package and release Go modules for every platform.
#[derive(Parser, Debug)]
#[command(name = "gorocket")]
#[command(about)]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Create a default .gorocket.yaml:\n",
    "    $ gorocket init\n\n",
    "  Build archives into dist/, replacing any previous output:\n",
    "    $ gorocket build --clean\n\n",
    "  Build and publish a draft release:\n",
    "    $ GITHUB_TOKEN=... gorocket release --draft\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Project root holding go.mod and .gorocket.yaml.
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub project_dir: Utf8PathBuf,

    /// Output directory [default: <project-dir>/dist].
    #[arg(long, global = true, value_name = "DIR")]
    pub dist_dir: Option<Utf8PathBuf>,

    /// Repository as owner/name instead of the origin remote.
    #[arg(long, global = true, value_name = "OWNER/NAME", env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a default .gorocket.yaml.
    Init,

    /// Build and package every configured target.
    Build(BuildArgs),

    /// Build, then publish a GitHub release.
    Release(ReleaseArgs),

    /// Print the gorocket version.
    Version,
}

/// Arguments for the build command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    /// Remove the output directory before building.
    #[arg(long)]
    pub clean: bool,
}

/// Arguments for the release command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseArgs {
    /// Remove the output directory before building.
    #[arg(long)]
    pub clean: bool,

    /// Create the release as a draft.
    #[arg(long)]
    pub draft: bool,

    /// API token used to publish.
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

impl Cli {
    /// Output directory, defaulting to `dist` under the project root.
    #[must_use]
    pub fn resolved_dist_dir(&self) -> Utf8PathBuf {
        self.dist_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.join(crate::pipeline::DEFAULT_DIST_DIR))
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
