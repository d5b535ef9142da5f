//! Release hosting capability.
//!
//! The release pipeline talks to the hosting API only through
//! [`ReleaseHost`], which exposes the five operations it needs. The `ureq`
//! implementation lives in [`client`].

pub mod client;

use crate::repository::RemoteRepository;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A release object on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Numeric release identifier.
    pub id: u64,
    /// Tag the release points at.
    pub tag_name: String,
    /// Browser URL of the release page.
    pub html_url: String,
    /// Templated asset upload URL, e.g. `.../assets{?name,label}`.
    pub upload_url: String,
    /// Whether the release is a draft.
    #[serde(default)]
    pub draft: bool,
}

/// Request body for creating a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag to create the release for.
    pub tag_name: String,
    /// Display name of the release.
    pub name: String,
    /// Create as a draft.
    pub draft: bool,
}

impl NewRelease {
    /// A release whose tag and name are both `version`.
    #[must_use]
    pub fn for_version(version: &str, draft: bool) -> Self {
        Self {
            tag_name: version.to_owned(),
            name: version.to_owned(),
            draft,
        }
    }
}

/// One file to attach to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Asset name shown on the release.
    pub name: String,
    /// Local file to upload.
    pub path: Utf8PathBuf,
}

/// Descriptor of an existing repository file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileContents {
    /// Blob SHA used as the revision token for updates.
    pub sha: String,
}

/// Create-or-update request for a repository file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    /// Commit message.
    pub message: String,
    /// New file content.
    pub content: Vec<u8>,
    /// Revision token of the file being replaced, if it exists.
    pub sha: Option<String>,
}

/// Errors returned by a [`ReleaseHost`].
#[derive(Debug, Error)]
pub enum HostError {
    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The request failed.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// The URL that was requested.
        url: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// A local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the local file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    /// Returns `true` for [`HostError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// The hosting operations used by the release pipeline.
///
/// # Examples
///
/// ```no_run
/// use gorocket::github::ReleaseHost;
/// use gorocket::github::client::GitHubClient;
/// use gorocket::repository::RemoteRepository;
///
/// let client = GitHubClient::new("ghp_example");
/// let repo = RemoteRepository::new("koki-develop", "gorocket");
/// match client.release_by_tag(&repo, "v1.0.0") {
///     Ok(release) => println!("found {}", release.html_url),
///     Err(err) if err.is_not_found() => println!("no release yet"),
///     Err(err) => return Err(err.into()),
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseHost {
    /// Looks up the release for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] when no such release exists.
    fn release_by_tag(&self, repo: &RemoteRepository, tag: &str) -> Result<Release, HostError>;

    /// Creates a release.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    fn create_release(
        &self,
        repo: &RemoteRepository,
        request: &NewRelease,
    ) -> Result<Release, HostError>;

    /// Streams one asset to `release`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    fn upload_asset(&self, release: &Release, asset: &ReleaseAsset) -> Result<(), HostError>;

    /// Reads the descriptor of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] when the file does not exist.
    fn file_contents(&self, repo: &RemoteRepository, path: &str)
    -> Result<FileContents, HostError>;

    /// Creates or updates the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the write.
    fn put_file(
        &self,
        repo: &RemoteRepository,
        path: &str,
        update: &FileUpdate,
    ) -> Result<(), HostError>;
}
