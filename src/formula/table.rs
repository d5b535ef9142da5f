//! Per-platform download table.

use std::collections::BTreeMap;

/// Download URL and checksum for one `(os, arch)` archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformAsset {
    /// Release download URL.
    pub url: String,
    /// Lowercase hex SHA-256 of the archive.
    pub sha256: String,
}

/// Mapping from OS to architecture to downloadable asset.
///
/// Any pair may be recorded; only the four formula slots are ever read back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformUrlTable {
    entries: BTreeMap<String, BTreeMap<String, PlatformAsset>>,
}

impl PlatformUrlTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the asset for `(os, arch)`, replacing any earlier entry.
    pub fn insert(&mut self, os: &str, arch: &str, asset: PlatformAsset) {
        self.entries
            .entry(os.to_owned())
            .or_default()
            .insert(arch.to_owned(), asset);
    }

    /// Looks up the asset for `(os, arch)`.
    #[must_use]
    pub fn get(&self, os: &str, arch: &str) -> Option<&PlatformAsset> {
        self.entries.get(os).and_then(|by_arch| by_arch.get(arch))
    }

    /// Number of recorded pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(tag: &str) -> PlatformAsset {
        PlatformAsset {
            url: format!("https://example.test/{tag}"),
            sha256: tag.to_owned(),
        }
    }

    #[test]
    fn later_insert_replaces_earlier() {
        let mut table = PlatformUrlTable::new();
        table.insert("linux", "amd64", asset("first"));
        table.insert("linux", "amd64", asset("second"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("linux", "amd64"), Some(&asset("second")));
    }

    #[test]
    fn unsupported_pairs_are_kept_but_separate() {
        let mut table = PlatformUrlTable::new();
        table.insert("freebsd", "riscv64", asset("bsd"));

        assert!(!table.is_empty());
        assert!(table.get("linux", "riscv64").is_none());
        assert!(table.get("freebsd", "riscv64").is_some());
    }
}
