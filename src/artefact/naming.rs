//! Archive naming policy.
//!
//! Every archive is named `{module}_{version}_{os}_{arch}.{ext}` and holds a
//! single directory of the same stem containing the binary.

use crate::build_info::BuildInfo;
use crate::target::ConcreteTarget;
use std::fmt;

use super::format::ArchiveFormat;

/// Names derived from a module, version and target.
///
/// # Examples
///
/// ```
/// use gorocket::artefact::naming::ArchiveName;
/// use gorocket::build_info::BuildInfo;
/// use gorocket::target::ConcreteTarget;
///
/// let info = BuildInfo::new("rocket", "v1.2.3");
/// let name = ArchiveName::new(&info, &ConcreteTarget::new("windows", "arm64"));
/// assert_eq!(name.file_name(), "rocket_v1.2.3_windows_arm64.zip");
/// assert_eq!(name.entry_path(), "rocket_v1.2.3_windows_arm64/rocket.exe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    module_name: String,
    stem: String,
    target: ConcreteTarget,
}

impl ArchiveName {
    /// Derives archive names for one target.
    #[must_use]
    pub fn new(info: &BuildInfo, target: &ConcreteTarget) -> Self {
        Self {
            module_name: info.module_name.clone(),
            stem: format!(
                "{}_{}_{}_{}",
                info.module_name, info.version, target.os, target.arch
            ),
            target: target.clone(),
        }
    }

    /// Container format for this target.
    #[must_use]
    pub fn format(&self) -> ArchiveFormat {
        ArchiveFormat::for_target(&self.target)
    }

    /// Name of the top-level directory inside the archive.
    #[must_use]
    pub fn layout_name(&self) -> &str {
        &self.stem
    }

    /// Archive file name including extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.stem, self.format().extension())
    }

    /// Path of the binary inside the archive, always `/`-separated.
    #[must_use]
    pub fn entry_path(&self) -> String {
        format!(
            "{}/{}{}",
            self.stem,
            self.module_name,
            self.target.exe_suffix()
        )
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::linux(
        "linux",
        "amd64",
        "rocket_v1.0.0_linux_amd64.tar.gz",
        "rocket_v1.0.0_linux_amd64/rocket"
    )]
    #[case::darwin(
        "darwin",
        "arm64",
        "rocket_v1.0.0_darwin_arm64.tar.gz",
        "rocket_v1.0.0_darwin_arm64/rocket"
    )]
    #[case::windows(
        "windows",
        "amd64",
        "rocket_v1.0.0_windows_amd64.zip",
        "rocket_v1.0.0_windows_amd64/rocket.exe"
    )]
    fn names_follow_layout(
        #[case] os: &str,
        #[case] arch: &str,
        #[case] file_name: &str,
        #[case] entry: &str,
    ) {
        let info = BuildInfo::new("rocket", "v1.0.0");
        let name = ArchiveName::new(&info, &ConcreteTarget::new(os, arch));
        assert_eq!(name.file_name(), file_name);
        assert_eq!(name.entry_path(), entry);
        assert_eq!(name.to_string(), file_name);
    }

    #[test]
    fn layout_name_is_file_stem() {
        let info = BuildInfo::new("rocket", "1.0.0");
        let name = ArchiveName::new(&info, &ConcreteTarget::new("linux", "386"));
        assert_eq!(name.layout_name(), "rocket_1.0.0_linux_386");
    }
}
