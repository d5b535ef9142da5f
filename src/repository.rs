//! GitHub repository coordinates.
//!
//! The primary repository is taken from an explicit `owner/name` override
//! (normally `GITHUB_REPOSITORY`) or, failing that, from the URL of the
//! `origin` remote.

use crate::error::{GorocketError, Result};
use crate::exec::{CommandExecutor, checked_stdout};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

const HTTPS_PREFIX: &str = "https://github.com/";
const SSH_PREFIX: &str = "git@github.com:";

/// Addressing coordinate for a repository on the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteRepository {
    /// Account or organisation that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RemoteRepository {
    /// Creates a repository coordinate.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parses a GitHub remote URL in HTTPS or SSH form.
///
/// An optional `.git` suffix is stripped in both forms; the HTTPS form also
/// tolerates one trailing slash.
///
/// # Errors
///
/// Returns [`GorocketError::InvalidRepositoryUrl`] when the URL does not
/// point at a GitHub repository.
///
/// # Examples
///
/// ```
/// use gorocket::repository::{RemoteRepository, parse_remote_url};
///
/// let repo = parse_remote_url("git@github.com:koki-develop/gorocket.git")?;
/// assert_eq!(repo, RemoteRepository::new("koki-develop", "gorocket"));
/// # Ok::<(), gorocket::error::GorocketError>(())
/// ```
pub fn parse_remote_url(url: &str) -> Result<RemoteRepository> {
    let path = if let Some(rest) = url.strip_prefix(HTTPS_PREFIX) {
        Some(rest.strip_suffix('/').unwrap_or(rest))
    } else {
        url.strip_prefix(SSH_PREFIX)
    };

    path.and_then(split_owner_name)
        .ok_or_else(|| GorocketError::InvalidRepositoryUrl {
            url: url.to_owned(),
        })
}

/// Splits `owner/name[.git]` into its two segments.
fn split_owner_name(path: &str) -> Option<RemoteRepository> {
    let (owner, raw_name) = path.split_once('/')?;
    let name = match raw_name.strip_suffix(".git") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => raw_name,
    };
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some(RemoteRepository::new(owner, name))
}

/// Resolves the primary repository for download URLs and release calls.
pub struct RepositoryResolver<'a> {
    executor: &'a dyn CommandExecutor,
    override_value: Option<String>,
}

impl<'a> RepositoryResolver<'a> {
    /// Creates a resolver. An empty override is treated as absent.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, override_value: Option<String>) -> Self {
        Self {
            executor,
            override_value: override_value.filter(|value| !value.is_empty()),
        }
    }

    /// Resolves the repository from the override or the `origin` remote.
    ///
    /// # Errors
    ///
    /// Returns [`GorocketError::InvalidRepositoryOverride`] for an override
    /// without a `/`, [`GorocketError::Git`] if the remote cannot be read,
    /// or [`GorocketError::InvalidRepositoryUrl`] if it cannot be parsed.
    pub fn resolve(&self) -> Result<RemoteRepository> {
        if let Some(value) = &self.override_value {
            return parse_override(value);
        }

        let output = self
            .executor
            .run("git", &["remote", "get-url", "origin"], &[])?;
        let url = checked_stdout(&output).map_err(|message| GorocketError::Git {
            operation: "remote get-url",
            message,
        })?;
        debug!("origin remote is {url}");
        parse_remote_url(&url)
    }
}

fn parse_override(value: &str) -> Result<RemoteRepository> {
    match value.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
            Ok(RemoteRepository::new(owner, name))
        }
        _ => Err(GorocketError::InvalidRepositoryOverride {
            value: value.to_owned(),
        }),
    }
}
