//! Unit tests for formula generation.

use super::*;
use crate::artefact::ArchiveError;
use crate::artefact::checksum::digest_reader;
use crate::compiler::BuildError;
use crate::target::ConcreteTarget;
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

struct ArchiveDir {
    _guard: TempDir,
    root: Utf8PathBuf,
}

impl ArchiveDir {
    fn archive(&self, os: &str, arch: &str, contents: &[u8]) -> ArchiveResult {
        let path = self.root.join(format!("rocket_v1.2.3_{os}_{arch}.tar.gz"));
        fs::write(&path, contents).expect("write archive");
        ArchiveResult {
            target: ConcreteTarget::new(os, arch),
            outcome: Ok(path),
        }
    }
}

#[fixture]
fn archive_dir() -> ArchiveDir {
    let guard = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(guard.path().to_path_buf()).expect("utf8");
    ArchiveDir {
        _guard: guard,
        root,
    }
}

fn info() -> BuildInfo {
    BuildInfo::new("rocket", "v1.2.3")
}

fn repo() -> RemoteRepository {
    RemoteRepository::new("acme", "rocket")
}

#[rstest]
#[case::plain("gorocket", "Gorocket")]
#[case::hyphen("go-rocket", "Gorocket")]
#[case::mixed("go-rocket_tool", "Gorockettool")]
#[case::module_path("github.com/owner/go-rocket", "Gorocket")]
#[case::empty("", "")]
#[case::only_separators("-_-", "")]
#[case::already_upper("Rocket", "Rocket")]
fn class_name_derivation(#[case] module: &str, #[case] expected: &str) {
    assert_eq!(class_name(module), expected);
}

#[rstest]
#[case("v1.2.3", "1.2.3")]
#[case("1.2.3", "1.2.3")]
#[case("vv1", "v1")]
#[case("", "")]
fn version_stripping(#[case] version: &str, #[case] expected: &str) {
    assert_eq!(display_version(version), expected);
}

#[test]
fn download_url_shape() {
    assert_eq!(
        download_url(&repo(), "v1.2.3", "rocket_v1.2.3_linux_amd64.tar.gz"),
        "https://github.com/acme/rocket/releases/download/v1.2.3/rocket_v1.2.3_linux_amd64.tar.gz"
    );
}

#[rstest]
fn populated_and_blank_slots(archive_dir: ArchiveDir) {
    let archives = vec![
        archive_dir.archive("linux", "amd64", b"linux"),
        archive_dir.archive("darwin", "arm64", b"darwin"),
        archive_dir.archive("freebsd", "amd64", b"bsd"),
    ];

    let formula = FormulaGenerator
        .generate(&info(), &archives, &repo())
        .expect("generate");

    let linux_sha = digest_reader(&b"linux"[..]).expect("digest");
    let darwin_sha = digest_reader(&b"darwin"[..]).expect("digest");
    assert!(formula.contains("class Rocket < Formula"));
    assert!(formula.contains("version \"1.2.3\""));
    assert!(formula.contains(&format!("sha256 \"{linux_sha}\"")));
    assert!(formula.contains(&format!("sha256 \"{darwin_sha}\"")));
    assert!(formula.contains(
        concat!(
            "url \"https://github.com/acme/rocket/releases/download/",
            "v1.2.3/rocket_v1.2.3_darwin_arm64.tar.gz\""
        )
    ));
    assert!(!formula.contains("freebsd"));
    assert_eq!(formula.matches("url \"\"").count(), 2);
}

#[rstest]
fn failed_archives_are_skipped(archive_dir: ArchiveDir) {
    let target = ConcreteTarget::new("linux", "arm64");
    let archives = vec![
        archive_dir.archive("linux", "amd64", b"ok"),
        ArchiveResult {
            target: target.clone(),
            outcome: Err(ArchiveError::Build(BuildError::Toolchain {
                target,
                diagnostics: "boom".to_owned(),
            })),
        },
    ];

    let table = FormulaGenerator
        .url_table(&info(), &archives, &repo())
        .expect("table");

    assert_eq!(table.len(), 1);
    assert!(table.get("linux", "arm64").is_none());
}

#[rstest]
fn unreadable_archive_aborts_generation(archive_dir: ArchiveDir) {
    let missing = archive_dir.root.join("rocket_v1.2.3_linux_amd64.tar.gz");
    let archives = vec![ArchiveResult {
        target: ConcreteTarget::new("linux", "amd64"),
        outcome: Ok(missing.clone()),
    }];

    let err = FormulaGenerator
        .generate(&info(), &archives, &repo())
        .expect_err("checksum should fail");

    assert!(matches!(err, FormulaError::Checksum { ref path, .. } if *path == missing));
    assert!(err.to_string().contains(missing.as_str()));
}
