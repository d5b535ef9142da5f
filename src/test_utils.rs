//! Shared test utilities for gorocket.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites in `tests/`.

use crate::error::{GorocketError, Result};
use crate::exec::CommandExecutor;
use crate::github::{
    FileContents, FileUpdate, HostError, NewRelease, Release, ReleaseAsset, ReleaseHost,
};
use crate::repository::RemoteRepository;
use crate::target::ConcreteTarget;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.unsigned_abs())
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    stdout_output("")
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// An expected command invocation and its canned result.
#[derive(Debug)]
pub struct ExpectedCall {
    cmd: String,
    args: Vec<String>,
    env: Option<Vec<(String, String)>>,
    result: Result<Output>,
}

impl ExpectedCall {
    /// Expects `cmd` with exactly `args`; succeeds with empty output unless
    /// [`Self::returning`] says otherwise.
    #[must_use]
    pub fn new(cmd: &str, args: &[&str]) -> Self {
        Self {
            cmd: cmd.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            env: None,
            result: Ok(success_output()),
        }
    }

    /// Also expects exactly these environment overrides.
    #[must_use]
    pub fn with_env(mut self, env: &[(&str, &str)]) -> Self {
        self.env = Some(
            env.iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
        );
        self
    }

    /// Sets the result returned to the caller.
    #[must_use]
    pub fn returning(mut self, result: Result<Output>) -> Self {
        self.result = result;
        self
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
        let mut expected = self.expected.borrow_mut();
        let Some(call) = expected.pop_front() else {
            panic!("unexpected command invocation: {cmd} {args:?}");
        };

        assert_eq!(call.cmd, cmd);
        assert_eq!(call.args, args);
        if let Some(expected_env) = call.env {
            let actual: Vec<(String, String)> = env
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect();
            assert_eq!(expected_env, actual);
        }

        call.result
    }
}

/// Stands in for `git` and `go` inside a throwaway project.
///
/// `go build` writes a fixed binary to the `-o` path unless the target was
/// marked as failing; `git describe` and `git remote get-url` answer from
/// the configured tag and remote.
#[derive(Debug)]
pub struct FakeGoToolchain {
    version: String,
    origin_url: Option<String>,
    binary: Vec<u8>,
    failing: Vec<ConcreteTarget>,
    builds: RefCell<Vec<ConcreteTarget>>,
}

impl FakeGoToolchain {
    /// A toolchain at tag `version` writing a 5-byte binary per target.
    #[must_use]
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_owned(),
            origin_url: None,
            binary: b"\x7fELF\n".to_vec(),
            failing: Vec::new(),
            builds: RefCell::new(Vec::new()),
        }
    }

    /// Sets the URL reported for the `origin` remote.
    #[must_use]
    pub fn with_origin(mut self, url: &str) -> Self {
        self.origin_url = Some(url.to_owned());
        self
    }

    /// Makes `go build` fail for `target`.
    #[must_use]
    pub fn failing_for(mut self, target: ConcreteTarget) -> Self {
        self.failing.push(target);
        self
    }

    /// Contents written for every successful build.
    #[must_use]
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// Targets built so far, in invocation order.
    #[must_use]
    pub fn builds(&self) -> Vec<ConcreteTarget> {
        self.builds.borrow().clone()
    }

    fn go_build(&self, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
        let lookup = |key: &str| {
            env.iter()
                .find(|(name, _)| *name == key)
                .map_or("", |(_, value)| *value)
        };
        let target = ConcreteTarget::new(lookup("GOOS"), lookup("GOARCH"));
        self.builds.borrow_mut().push(target.clone());

        if self.failing.contains(&target) {
            return Ok(failure_output(&format!(
                "cmd/go: unsupported GOOS/GOARCH pair {target}"
            )));
        }
        let Some(output_path) = args
            .iter()
            .position(|arg| *arg == "-o")
            .and_then(|index| args.get(index + 1))
        else {
            return Ok(failure_output("go build: missing -o"));
        };
        std::fs::write(output_path, &self.binary)?;
        Ok(success_output())
    }
}

impl CommandExecutor for FakeGoToolchain {
    fn run(&self, cmd: &str, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
        match (cmd, args.first().copied()) {
            ("go", Some("build")) => self.go_build(args, env),
            ("git", Some("describe")) => Ok(stdout_output(&format!("{}\n", self.version))),
            ("git", Some("remote")) => Ok(self.origin_url.as_deref().map_or_else(
                || failure_output("error: No such remote 'origin'"),
                stdout_output,
            )),
            _ => Err(GorocketError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{cmd}: not available in fake toolchain"),
            ))),
        }
    }
}

/// An uploaded asset as seen by [`FakeReleaseHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Release the asset was attached to.
    pub release_id: u64,
    /// Asset name.
    pub name: String,
    /// Uploaded bytes.
    pub content: Vec<u8>,
}

/// In-memory release host recording every mutation.
#[derive(Debug)]
pub struct FakeReleaseHost {
    releases: RefCell<Vec<Release>>,
    next_id: Cell<u64>,
    created: RefCell<Vec<NewRelease>>,
    uploads: RefCell<Vec<UploadedAsset>>,
    files: RefCell<BTreeMap<String, String>>,
    puts: RefCell<Vec<(String, FileUpdate)>>,
}

impl Default for FakeReleaseHost {
    fn default() -> Self {
        Self {
            releases: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            created: RefCell::new(Vec::new()),
            uploads: RefCell::new(Vec::new()),
            files: RefCell::new(BTreeMap::new()),
            puts: RefCell::new(Vec::new()),
        }
    }
}

impl FakeReleaseHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a repository file with revision token `sha`.
    #[must_use]
    pub fn with_file(self, repo: &RemoteRepository, path: &str, sha: &str) -> Self {
        self.files
            .borrow_mut()
            .insert(file_key(repo, path), sha.to_owned());
        self
    }

    /// Release creation requests received so far.
    #[must_use]
    pub fn created(&self) -> Vec<NewRelease> {
        self.created.borrow().clone()
    }

    /// Assets uploaded so far.
    #[must_use]
    pub fn uploads(&self) -> Vec<UploadedAsset> {
        self.uploads.borrow().clone()
    }

    /// File writes received so far, keyed by `owner/name/path`.
    #[must_use]
    pub fn puts(&self) -> Vec<(String, FileUpdate)> {
        self.puts.borrow().clone()
    }
}

fn file_key(repo: &RemoteRepository, path: &str) -> String {
    format!("{repo}/{path}")
}

impl ReleaseHost for FakeReleaseHost {
    fn release_by_tag(
        &self,
        repo: &RemoteRepository,
        tag: &str,
    ) -> std::result::Result<Release, HostError> {
        self.releases
            .borrow()
            .iter()
            .find(|release| release.tag_name == tag)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                url: format!("{repo}/releases/tags/{tag}"),
            })
    }

    fn create_release(
        &self,
        repo: &RemoteRepository,
        request: &NewRelease,
    ) -> std::result::Result<Release, HostError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let release = Release {
            id,
            tag_name: request.tag_name.clone(),
            html_url: format!("https://github.com/{repo}/releases/tag/{}", request.tag_name),
            upload_url: format!(
                "https://uploads.github.com/repos/{repo}/releases/{id}/assets{{?name,label}}"
            ),
            draft: request.draft,
        };
        self.created.borrow_mut().push(request.clone());
        self.releases.borrow_mut().push(release.clone());
        Ok(release)
    }

    fn upload_asset(
        &self,
        release: &Release,
        asset: &ReleaseAsset,
    ) -> std::result::Result<(), HostError> {
        let content = std::fs::read(&asset.path).map_err(|source| HostError::Io {
            path: asset.path.clone(),
            source,
        })?;
        self.uploads.borrow_mut().push(UploadedAsset {
            release_id: release.id,
            name: asset.name.clone(),
            content,
        });
        Ok(())
    }

    fn file_contents(
        &self,
        repo: &RemoteRepository,
        path: &str,
    ) -> std::result::Result<FileContents, HostError> {
        let key = file_key(repo, path);
        self.files
            .borrow()
            .get(&key)
            .map(|sha| FileContents { sha: sha.clone() })
            .ok_or(HostError::NotFound { url: key })
    }

    fn put_file(
        &self,
        repo: &RemoteRepository,
        path: &str,
        update: &FileUpdate,
    ) -> std::result::Result<(), HostError> {
        let key = file_key(repo, path);
        let revision = format!("rev-{}", self.puts.borrow().len() + 1);
        self.files.borrow_mut().insert(key.clone(), revision);
        self.puts.borrow_mut().push((key, update.clone()));
        Ok(())
    }
}
