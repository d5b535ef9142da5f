//! Packaging of build results into release archives.

use super::ArchiveError;
use super::naming::ArchiveName;
use crate::build_info::BuildInfo;
use crate::compiler::BuildResult;
use crate::target::ConcreteTarget;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Outcome of packaging one target.
#[derive(Debug)]
pub struct ArchiveResult {
    /// The target the archive belongs to.
    pub target: ConcreteTarget,
    /// Path to the archive, or the reason there is none.
    pub outcome: Result<Utf8PathBuf, ArchiveError>,
}

impl ArchiveResult {
    /// Path to the archive when packaging succeeded.
    #[must_use]
    pub fn archive_path(&self) -> Option<&Utf8Path> {
        self.outcome.as_ref().ok().map(Utf8PathBuf::as_path)
    }

    /// The failure when packaging did not succeed.
    #[must_use]
    pub fn error(&self) -> Option<&ArchiveError> {
        self.outcome.as_ref().err()
    }
}

/// Writes one archive per successful build into the output directory.
pub struct Archiver {
    output_dir: Utf8PathBuf,
}

impl Archiver {
    /// Creates an archiver writing into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Packages one build result.
    ///
    /// A failed build is carried through as the archive error without
    /// touching the filesystem.
    #[must_use]
    pub fn create_archive(&self, info: &BuildInfo, result: BuildResult) -> ArchiveResult {
        let BuildResult { target, outcome } = result;
        let outcome = outcome.map_err(ArchiveError::from).and_then(|binary| {
            let name = ArchiveName::new(info, &target);
            let archive = name.format().package(&binary, &name, &self.output_dir)?;
            info!("created {archive}");
            Ok(archive)
        });
        ArchiveResult { target, outcome }
    }

    /// Packages every build result, keeping one archive result per input.
    #[must_use]
    pub fn create_archives(
        &self,
        info: &BuildInfo,
        results: Vec<BuildResult>,
    ) -> Vec<ArchiveResult> {
        results
            .into_iter()
            .map(|result| self.create_archive(info, result))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::BuildError;
    use std::fs;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8");
        (dir, root)
    }

    #[test]
    fn failed_build_propagates_without_writing() {
        let (_guard, root) = temp_root();
        let target = ConcreteTarget::new("linux", "amd64");
        let failure = BuildError::Toolchain {
            target: target.clone(),
            diagnostics: "undefined: main".to_owned(),
        };
        let archiver = Archiver::new(root.clone());

        let result = archiver.create_archive(
            &BuildInfo::new("rocket", "v1.0.0"),
            BuildResult {
                target,
                outcome: Err(failure.clone()),
            },
        );

        assert!(result.archive_path().is_none());
        assert!(matches!(result.error(), Some(ArchiveError::Build(err)) if *err == failure));
        assert_eq!(fs::read_dir(&root).expect("read dir").count(), 0);
    }

    #[test]
    fn batch_keeps_one_result_per_build() {
        let (_guard, root) = temp_root();
        let binary = root.join("rocket_bin");
        fs::write(&binary, b"12345").expect("write binary");
        let linux = ConcreteTarget::new("linux", "amd64");
        let windows = ConcreteTarget::new("windows", "amd64");
        let builds = vec![
            BuildResult {
                target: linux.clone(),
                outcome: Ok(binary.clone()),
            },
            BuildResult {
                target: windows.clone(),
                outcome: Err(BuildError::Toolchain {
                    target: windows,
                    diagnostics: "boom".to_owned(),
                }),
            },
        ];

        let info = BuildInfo::new("rocket", "v1.0.0");
        let results = Archiver::new(root.clone()).create_archives(&info, builds);

        assert_eq!(results.len(), 2);
        let first = results.first().expect("first result");
        assert_eq!(first.target, linux);
        assert_eq!(
            first.archive_path(),
            Some(root.join("rocket_v1.0.0_linux_amd64.tar.gz").as_path())
        );
        assert!(results.get(1).and_then(ArchiveResult::error).is_some());
    }
}
