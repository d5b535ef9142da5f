//! Build target matrix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// OS name whose binaries carry an `.exe` suffix and ship as zip archives.
pub const WINDOWS_OS: &str = "windows";

/// One configuration entry: an OS paired with the architectures to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Go `GOOS` value, e.g. `linux`.
    pub os: String,
    /// Go `GOARCH` values, built in listed order. Must be non-empty.
    pub arch: Vec<String>,
}

impl Target {
    /// Creates a target from an OS and its architectures.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: &[&str]) -> Self {
        Self {
            os: os.into(),
            arch: arch.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

/// One fully resolved `(os, arch)` build unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConcreteTarget {
    /// Go `GOOS` value.
    pub os: String,
    /// Go `GOARCH` value.
    pub arch: String,
}

impl ConcreteTarget {
    /// Creates a concrete target.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Returns `true` for the Windows OS family.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == WINDOWS_OS
    }

    /// Executable suffix for this target's OS.
    #[must_use]
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }
}

impl fmt::Display for ConcreteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Flattens configured targets into concrete build units.
///
/// Order follows the configuration: outer loop over entries, inner loop over
/// each entry's architectures. Duplicates are kept, so a pair listed twice
/// is built twice.
///
/// # Examples
///
/// ```
/// use gorocket::target::{ConcreteTarget, Target, expand_targets};
///
/// let targets = [
///     Target::new("linux", &["amd64", "arm64"]),
///     Target::new("darwin", &["arm64"]),
/// ];
/// let expanded = expand_targets(&targets);
/// assert_eq!(expanded.len(), 3);
/// assert_eq!(expanded.last(), Some(&ConcreteTarget::new("darwin", "arm64")));
/// ```
#[must_use]
pub fn expand_targets(targets: &[Target]) -> Vec<ConcreteTarget> {
    targets
        .iter()
        .flat_map(|target| {
            target
                .arch
                .iter()
                .map(|arch| ConcreteTarget::new(target.os.as_str(), arch.as_str()))
        })
        .collect()
}
