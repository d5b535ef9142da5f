//! Unit tests for pipeline orchestration.

use super::*;
use crate::test_utils::{FakeGoToolchain, FakeReleaseHost};
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

const TWO_TARGETS: &str = concat!(
    "build:\n",
    "  ldflags: \"-X main.version={{ Version }}\"\n",
    "  targets:\n",
    "    - os: linux\n",
    "      arch: [amd64]\n",
    "    - os: darwin\n",
    "      arch: [arm64]\n",
);

const WITH_BREW: &str = concat!(
    "brew:\n",
    "  repository:\n",
    "    owner: acme\n",
    "    name: homebrew-tap\n",
);

struct Project {
    _guard: TempDir,
    layout: ProjectLayout,
}

impl Project {
    fn write_config(&self, contents: &str) {
        fs::write(self.layout.config_path(), contents).expect("write config");
    }

    fn dist_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.layout.dist_dir)
            .expect("read dist")
            .map(|entry| {
                entry
                    .expect("dist entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

#[fixture]
fn project() -> Project {
    let guard = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(guard.path().to_path_buf()).expect("utf8");
    fs::write(root.join("go.mod"), "module github.com/acme/rocket\n\ngo 1.22\n")
        .expect("write go.mod");
    Project {
        _guard: guard,
        layout: ProjectLayout::new(root),
    }
}

fn progress_text(progress: Vec<u8>) -> String {
    String::from_utf8(progress).expect("utf8 progress")
}

#[test]
fn layout_defaults_dist_under_root() {
    let layout = ProjectLayout::new("/work/rocket");
    assert_eq!(layout.dist_dir, Utf8PathBuf::from("/work/rocket/dist"));
    assert_eq!(
        layout.config_path(),
        Utf8PathBuf::from("/work/rocket/.gorocket.yaml")
    );
    let custom = layout.with_dist_dir("/tmp/out");
    assert_eq!(custom.dist_dir, Utf8PathBuf::from("/tmp/out"));
}

#[rstest]
fn build_writes_one_archive_per_target(project: Project) {
    project.write_config(TWO_TARGETS);
    let toolchain = FakeGoToolchain::new("v1.0.0");
    let mut progress = Vec::new();

    let report = Pipeline::new(project.layout.clone(), &toolchain)
        .build(false, &mut progress)
        .expect("build");

    assert_eq!(report.info, BuildInfo::new("rocket", "v1.0.0"));
    assert_eq!(report.archives.len(), 2);
    assert!(report.formula.is_none());
    assert_eq!(
        project.dist_entries(),
        [
            "rocket_v1.0.0_darwin_arm64.tar.gz",
            "rocket_v1.0.0_linux_amd64.tar.gz"
        ]
    );
    assert_eq!(
        toolchain.builds(),
        [
            ConcreteTarget::new("linux", "amd64"),
            ConcreteTarget::new("darwin", "arm64")
        ]
    );
    let text = progress_text(progress);
    assert!(text.starts_with("Building rocket version v1.0.0\n"));
    assert!(text.contains("Built linux/amd64\n"));
    assert!(text.ends_with("Build completed successfully!\n"));
}

#[rstest]
fn build_renders_formula_when_brew_configured(project: Project) {
    project.write_config(&format!("{TWO_TARGETS}{WITH_BREW}"));
    let toolchain = FakeGoToolchain::new("v1.0.0").with_origin("git@github.com:acme/rocket.git");

    let report = Pipeline::new(project.layout.clone(), &toolchain)
        .build(false, &mut Vec::new())
        .expect("build");

    let formula = report.formula.expect("formula path");
    assert_eq!(formula, project.layout.dist_dir.join("rocket.rb"));
    assert_eq!(report.repository, Some(RemoteRepository::new("acme", "rocket")));
    assert_eq!(report.tap, Some(RemoteRepository::new("acme", "homebrew-tap")));
    let text = fs::read_to_string(formula).expect("read formula");
    assert!(text.contains("class Rocket < Formula"));
    assert!(text.contains(
        "https://github.com/acme/rocket/releases/download/v1.0.0/rocket_v1.0.0_linux_amd64.tar.gz"
    ));
}

#[rstest]
fn repository_override_skips_origin_lookup(project: Project) {
    project.write_config(&format!("{TWO_TARGETS}{WITH_BREW}"));
    let toolchain = FakeGoToolchain::new("v1.0.0");

    let report = Pipeline::new(project.layout.clone(), &toolchain)
        .with_repository_override(Some("fork/rocket".to_owned()))
        .build(false, &mut Vec::new())
        .expect("build");

    assert_eq!(report.repository, Some(RemoteRepository::new("fork", "rocket")));
}

#[rstest]
fn repeated_target_is_built_twice_and_archived_once(project: Project) {
    project.write_config(concat!(
        "build:\n",
        "  targets:\n",
        "    - os: linux\n",
        "      arch: [amd64]\n",
        "    - os: linux\n",
        "      arch: [amd64]\n",
    ));
    let toolchain = FakeGoToolchain::new("v1.0.0");

    let report = Pipeline::new(project.layout.clone(), &toolchain)
        .build(false, &mut Vec::new())
        .expect("repeated target should build");

    assert_eq!(toolchain.builds().len(), 2);
    assert_eq!(report.archives.len(), 2);
    assert_eq!(project.dist_entries(), ["rocket_v1.0.0_linux_amd64.tar.gz"]);
}

#[rstest]
fn failed_targets_are_all_reported(project: Project) {
    project.write_config(TWO_TARGETS);
    let toolchain = FakeGoToolchain::new("v1.0.0")
        .failing_for(ConcreteTarget::new("darwin", "arm64"));
    let mut progress = Vec::new();

    let err = Pipeline::new(project.layout.clone(), &toolchain)
        .build(false, &mut progress)
        .expect_err("build should fail");

    match err {
        GorocketError::CompilationFailed { count, summary } => {
            assert_eq!(count, 1);
            assert!(summary.starts_with("darwin/arm64: "), "{summary}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(toolchain.builds().len(), 2);
    assert!(
        project
            .dist_entries()
            .iter()
            .all(|name| !name.ends_with(".tar.gz"))
    );
    assert!(progress_text(progress).contains("Failed darwin/arm64"));
}

#[rstest]
fn missing_config_is_reported_before_git(project: Project) {
    let toolchain = FakeGoToolchain::new("v1.0.0");

    let err = Pipeline::new(project.layout.clone(), &toolchain)
        .build(false, &mut Vec::new())
        .expect_err("no config");

    assert!(err.to_string().ends_with(".gorocket.yaml not found. Run 'gorocket init' first"));
}

#[rstest]
fn non_empty_dist_needs_clean(project: Project) {
    project.write_config(TWO_TARGETS);
    fs::create_dir_all(&project.layout.dist_dir).expect("mkdir");
    fs::write(project.layout.dist_dir.join("stale.txt"), "old").expect("write stale");
    let toolchain = FakeGoToolchain::new("v1.0.0");
    let pipeline = Pipeline::new(project.layout.clone(), &toolchain);

    let err = pipeline.build(false, &mut Vec::new()).expect_err("dirty dist");
    assert!(matches!(err, GorocketError::DistNotEmpty { .. }));
    assert!(toolchain.builds().is_empty());

    pipeline.build(true, &mut Vec::new()).expect("clean build");
    assert!(!project.dist_entries().contains(&"stale.txt".to_owned()));
}

#[rstest]
fn release_is_idempotent(project: Project) {
    project.write_config(TWO_TARGETS);
    let toolchain = FakeGoToolchain::new("v1.0.0").with_origin("https://github.com/acme/rocket");
    let host = FakeReleaseHost::new();
    let pipeline = Pipeline::new(project.layout.clone(), &toolchain);

    let first = pipeline
        .release(&host, false, false, &mut Vec::new())
        .expect("first release");
    assert!(first.created);
    assert_eq!(host.uploads().len(), 2);

    let mut progress = Vec::new();
    let second = pipeline
        .release(&host, true, false, &mut progress)
        .expect("second release");
    assert!(!second.created);
    assert_eq!(host.created().len(), 1);
    assert_eq!(host.uploads().len(), 2);
    assert!(progress_text(progress).contains("Release v1.0.0 already exists"));
}

#[rstest]
fn prepare_dist_dir_creates_missing_directory(project: Project) {
    prepare_dist_dir(&project.layout.dist_dir, false).expect("prepare");
    assert!(project.layout.dist_dir.is_dir());
    prepare_dist_dir(&project.layout.dist_dir, false).expect("empty dir is accepted");
}
