//! Per-invocation build identity.
//!
//! The module name comes from the `module` directive of `go.mod`; the version
//! is the git tag pointing exactly at `HEAD`.

use crate::error::{GorocketError, Result};
use crate::exec::{CommandExecutor, checked_stdout};
use camino::Utf8Path;
use log::debug;

/// File holding the Go module directive.
pub const GO_MOD_FILE: &str = "go.mod";

/// Module name and version shared by every stage of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Trailing path segment of the Go module path.
    pub module_name: String,
    /// Git tag being released; may carry a leading `v`.
    pub version: String,
}

impl BuildInfo {
    /// Creates build info from known values.
    #[must_use]
    pub fn new(module_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            version: version.into(),
        }
    }

    /// Reads the module name from `{root}/go.mod` and the version from git.
    ///
    /// # Errors
    ///
    /// Returns [`GorocketError::GoModule`] if `go.mod` is missing or has no
    /// module directive, and [`GorocketError::Git`] if `HEAD` is not tagged.
    pub fn detect(root: &Utf8Path, executor: &dyn CommandExecutor) -> Result<Self> {
        let module_name = read_module_name(root)?;
        let version = current_version(executor)?;
        debug!("detected module {module_name} at {version}");
        Ok(Self {
            module_name,
            version,
        })
    }
}

/// Reads `go.mod` under `root` and returns the module's trailing segment.
///
/// # Errors
///
/// Returns [`GorocketError::GoModule`] when the file cannot be read or
/// declares no module.
pub fn read_module_name(root: &Utf8Path) -> Result<String> {
    let path = root.join(GO_MOD_FILE);
    let contents = std::fs::read_to_string(&path).map_err(|err| GorocketError::GoModule {
        path: path.clone(),
        reason: err.to_string(),
    })?;
    parse_module_name(&contents).ok_or_else(|| GorocketError::GoModule {
        path,
        reason: "no module directive".to_owned(),
    })
}

/// Extracts the trailing module path segment from `go.mod` contents.
///
/// # Examples
///
/// ```
/// use gorocket::build_info::parse_module_name;
///
/// let go_mod = "module github.com/koki-develop/gorocket\n\ngo 1.22\n";
/// assert_eq!(parse_module_name(go_mod).as_deref(), Some("gorocket"));
/// ```
#[must_use]
pub fn parse_module_name(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest
            .split("//")
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c: char| c == '"' || c == '`');
        let name = path.rsplit('/').next().unwrap_or(path);
        (!name.is_empty()).then(|| name.to_owned())
    })
}

/// Returns the tag that points exactly at `HEAD`.
///
/// # Errors
///
/// Returns [`GorocketError::Git`] when `HEAD` carries no tag.
pub fn current_version(executor: &dyn CommandExecutor) -> Result<String> {
    let output = executor.run("git", &["describe", "--tags", "--exact-match", "HEAD"], &[])?;
    let version = checked_stdout(&output).map_err(|message| GorocketError::Git {
        operation: "describe",
        message,
    })?;
    if version.is_empty() {
        return Err(GorocketError::Git {
            operation: "describe",
            message: "no tag points at HEAD".to_owned(),
        });
    }
    Ok(version)
}
