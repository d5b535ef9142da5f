//! gorocket library.
//!
//! This crate cross-compiles a Go module for a matrix of platforms, packages
//! each binary as a release archive, renders a Homebrew formula from the
//! archive checksums and publishes everything as a GitHub release. It backs
//! the `gorocket` CLI binary and can be driven programmatically with a
//! custom [`exec::CommandExecutor`] or [`github::ReleaseHost`].
//!
//! # Modules
//!
//! - [`artefact`] - Archive naming, packaging and checksums
//! - [`build_info`] - Module name and version detection
//! - [`cli`] - Command-line argument definitions
//! - [`compiler`] - Per-target `go build` invocation
//! - [`config`] - `.gorocket.yaml` loading and scaffolding
//! - [`error`] - Crate-wide error type
//! - [`exec`] - External command execution
//! - [`formula`] - Homebrew formula generation
//! - [`github`] - Release hosting API
//! - [`logging`] - Diagnostic log setup
//! - [`output`] - User-facing progress lines
//! - [`pipeline`] - Build and release orchestration
//! - [`release`] - Release reconciliation
//! - [`repository`] - Repository coordinates and remote URL parsing
//! - [`target`] - Target matrix expansion

pub mod artefact;
pub mod build_info;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod exec;
pub mod formula;
pub mod github;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod release;
pub mod repository;
pub mod target;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
