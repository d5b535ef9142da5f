//! Homebrew formula generation.
//!
//! Archives are hashed, mapped onto the four `{darwin,linux}x{amd64,arm64}`
//! formula slots, and rendered through a fixed template. Targets outside
//! those slots are hashed but never appear in the formula.
//!
//! # Sub-modules
//!
//! - [`table`] - Per-platform URL and checksum table (`PlatformUrlTable`).
//! - [`template`] - The fixed formula template and its context.

pub mod table;
pub mod template;

use crate::artefact::archiver::ArchiveResult;
use crate::artefact::checksum::compute_sha256;
use crate::build_info::BuildInfo;
use crate::repository::RemoteRepository;
use camino::Utf8PathBuf;
use log::debug;
use table::{PlatformAsset, PlatformUrlTable};
use template::{FormulaContext, FormulaSlot, render_formula};
use thiserror::Error;

/// Host serving release downloads.
pub const DOWNLOAD_HOST: &str = "github.com";

/// Extension of the generated formula file.
pub const FORMULA_EXTENSION: &str = "rb";

/// Errors raised while producing the formula.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// An archive could not be hashed.
    #[error("failed to compute checksum for {path}: {source}")]
    Checksum {
        /// Path of the archive.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An archive path has no file name component.
    #[error("archive path {path} has no file name")]
    ArchiveName {
        /// The offending path.
        path: Utf8PathBuf,
    },

    /// The template failed to render.
    #[error("failed to render formula: {0}")]
    Render(#[from] minijinja::Error),
}

/// File name of the formula for `module_name`.
#[must_use]
pub fn formula_file_name(module_name: &str) -> String {
    format!("{module_name}.{FORMULA_EXTENSION}")
}

/// Strips a single leading `v` from `version`.
///
/// # Examples
///
/// ```
/// use gorocket::formula::display_version;
///
/// assert_eq!(display_version("v1.2.3"), "1.2.3");
/// assert_eq!(display_version("1.2.3"), "1.2.3");
/// ```
#[must_use]
pub fn display_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Derives the Ruby class name for a module.
///
/// The last `/` segment is kept, every `-` and `_` is dropped, and only the
/// first character is upper-cased.
///
/// # Examples
///
/// ```
/// use gorocket::formula::class_name;
///
/// assert_eq!(class_name("github.com/owner/go-rocket"), "Gorocket");
/// assert_eq!(class_name("go-rocket_tool"), "Gorockettool");
/// ```
#[must_use]
pub fn class_name(module_name: &str) -> String {
    let segment = module_name.rsplit('/').next().unwrap_or(module_name);
    let mut chars = segment.chars().filter(|c| !matches!(c, '-' | '_'));
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Download URL of `file_name` attached to the `version` release.
#[must_use]
pub fn download_url(repo: &RemoteRepository, version: &str, file_name: &str) -> String {
    format!(
        "https://{DOWNLOAD_HOST}/{}/{}/releases/download/{version}/{file_name}",
        repo.owner, repo.name
    )
}

/// Hashes archives and renders the Homebrew formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaGenerator;

impl FormulaGenerator {
    /// Builds the URL table for every successful archive.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::Checksum`] naming the first archive that could
    /// not be hashed.
    pub fn url_table(
        &self,
        info: &BuildInfo,
        archives: &[ArchiveResult],
        repo: &RemoteRepository,
    ) -> Result<PlatformUrlTable, FormulaError> {
        let mut table = PlatformUrlTable::new();
        for archive in archives {
            let Some(path) = archive.archive_path() else {
                continue;
            };
            let digest = compute_sha256(path).map_err(|source| FormulaError::Checksum {
                path: path.to_owned(),
                source,
            })?;
            let file_name = path.file_name().ok_or_else(|| FormulaError::ArchiveName {
                path: path.to_owned(),
            })?;
            debug!("{file_name}: sha256 {digest}");
            table.insert(
                &archive.target.os,
                &archive.target.arch,
                PlatformAsset {
                    url: download_url(repo, &info.version, file_name),
                    sha256: digest.into_inner(),
                },
            );
        }
        Ok(table)
    }

    /// Renders the formula text for the given archives.
    ///
    /// # Errors
    ///
    /// Returns a [`FormulaError`] if hashing or rendering fails; nothing is
    /// rendered in that case.
    pub fn generate(
        &self,
        info: &BuildInfo,
        archives: &[ArchiveResult],
        repo: &RemoteRepository,
    ) -> Result<String, FormulaError> {
        let table = self.url_table(info, archives, repo)?;
        let slot = |os: &str, arch: &str| {
            table
                .get(os, arch)
                .map(|asset| FormulaSlot {
                    url: asset.url.clone(),
                    sha256: asset.sha256.clone(),
                })
                .unwrap_or_default()
        };
        let context = FormulaContext {
            class_name: class_name(&info.module_name),
            version: display_version(&info.version).to_owned(),
            module_name: info.module_name.clone(),
            darwin_amd64: slot("darwin", "amd64"),
            darwin_arm64: slot("darwin", "arm64"),
            linux_amd64: slot("linux", "amd64"),
            linux_arm64: slot("linux", "arm64"),
        };
        Ok(render_formula(&context)?)
    }
}

#[cfg(test)]
#[path = "formula_tests.rs"]
mod tests;
