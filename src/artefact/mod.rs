//! Release archive naming, packaging and checksums.
//!
//! # Sub-modules
//!
//! - [`naming`] - Archive file and internal layout names (`ArchiveName`).
//! - [`format`] - Container strategy selected by target OS (`ArchiveFormat`).
//! - [`archiver`] - Per-target packaging of build results (`Archiver`).
//! - [`checksum`] - SHA-256 digests of finished archives (`Sha256Digest`).

pub mod archiver;
pub mod checksum;
pub mod format;
pub mod naming;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::compiler::BuildError;

/// Errors raised while writing one archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The target never produced a binary; carried through unchanged.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The archive file could not be created.
    #[error("failed to create archive file {path}: {source}")]
    CreateArchive {
        /// Path of the archive.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiled binary could not be opened.
    #[error("failed to open source file {path}: {source}")]
    OpenSource {
        /// Path of the binary.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiled binary could not be stat'ed.
    #[error("failed to get file info for {path}: {source}")]
    StatSource {
        /// Path of the binary.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The tar header could not be prepared.
    #[error("failed to write tar header: {source}")]
    TarHeader {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The binary could not be copied into the tar stream.
    #[error("failed to write file to tar: {source}")]
    TarContent {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The zip entry could not be started.
    #[error("failed to create zip entry: {source}")]
    ZipEntry {
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// The binary could not be copied into the zip entry.
    #[error("failed to write file to zip: {source}")]
    ZipContent {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The container trailer or compression stream could not be flushed.
    #[error("failed to finish archive {path}: {reason}")]
    Finish {
        /// Path of the archive.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },
}
