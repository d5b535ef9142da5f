//! Project configuration (`.gorocket.yaml`).
//!
//! The file is rendered as a template before it is decoded, so values such
//! as `ldflags` can reference the version being built:
//!
//! ```yaml
//! build:
//!   ldflags: "-s -w -X main.version={{ Version }}"
//!   targets:
//!     - os: linux
//!       arch: [amd64, arm64]
//! ```
//!
//! The variables are `Version` (the git tag) and `Module` (the module name).
//! Referencing any other variable is an error.

use crate::build_info::BuildInfo;
use crate::error::{GorocketError, Result};
use crate::repository::RemoteRepository;
use crate::target::Target;
use camino::Utf8Path;
use minijinja::{Environment, UndefinedBehavior, context};
use serde::{Deserialize, Serialize};

/// Configuration file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = ".gorocket.yaml";

/// Configuration written by `gorocket init`.
pub const DEFAULT_CONFIG: &str = r#"build:
  ldflags: "-s -w -X main.version={{ Version }}"
  targets:
    - os: darwin
      arch:
        - amd64
        - arm64
    - os: linux
      arch:
        - amd64
        - arm64
    - os: windows
      arch:
        - amd64
        - arm64

# Uncomment to generate a Homebrew formula and push it to a tap repository.
# brew:
#   repository:
#     owner: your-name
#     name: homebrew-tap
"#;

/// Decoded project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Build settings.
    pub build: BuildSection,
    /// Homebrew settings; absent disables the formula and tap update.
    #[serde(default)]
    pub brew: Option<BrewSection>,
}

/// The `build` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Targets to build, in order.
    pub targets: Vec<Target>,
    /// Flags passed to `go build -ldflags`; empty means none.
    #[serde(default)]
    pub ldflags: String,
}

/// The `brew` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrewSection {
    /// Tap repository receiving the formula.
    pub repository: RemoteRepository,
}

impl Config {
    /// Loads, renders and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GorocketError::ConfigNotFound`] when the file is missing and
    /// [`GorocketError::InvalidConfig`] when it cannot be rendered, decoded
    /// or validated.
    pub fn load(path: &Utf8Path, info: &BuildInfo) -> Result<Self> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(GorocketError::ConfigNotFound {
                    path: path.to_owned(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        Self::parse(&source, info).map_err(|reason| GorocketError::InvalidConfig {
            path: path.to_owned(),
            reason,
        })
    }

    /// Renders `source` with `info` and decodes the result.
    ///
    /// # Errors
    ///
    /// Returns a description of the first rendering, decoding or validation
    /// problem.
    ///
    /// # Examples
    ///
    /// ```
    /// use gorocket::build_info::BuildInfo;
    /// use gorocket::config::Config;
    ///
    /// let source = concat!(
    ///     "build:\n",
    ///     "  ldflags: \"-X main.version={{ Version }}\"\n",
    ///     "  targets:\n",
    ///     "    - os: linux\n",
    ///     "      arch: [amd64]\n",
    /// );
    /// let config = Config::parse(source, &BuildInfo::new("rocket", "v1.0.0"))?;
    /// assert_eq!(config.build.ldflags, "-X main.version=v1.0.0");
    /// # Ok::<(), String>(())
    /// ```
    pub fn parse(source: &str, info: &BuildInfo) -> std::result::Result<Self, String> {
        let rendered = render(source, info).map_err(|err| err.to_string())?;
        let config: Self = serde_yml::from_str(&rendered).map_err(|err| err.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.build.targets.is_empty() {
            return Err("build.targets must list at least one target".to_owned());
        }
        for target in &self.build.targets {
            if target.os.is_empty() {
                return Err("every target needs an os".to_owned());
            }
            if target.arch.is_empty() {
                return Err(format!("target {} lists no architectures", target.os));
            }
        }
        Ok(())
    }

    /// Tap repository, when a Homebrew section is configured.
    #[must_use]
    pub fn tap(&self) -> Option<&RemoteRepository> {
        self.brew.as_ref().map(|brew| &brew.repository)
    }
}

fn render(source: &str, info: &BuildInfo) -> std::result::Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.render_str(
        source,
        context! {
            Version => info.version.as_str(),
            Module => info.module_name.as_str(),
        },
    )
}

/// Writes [`DEFAULT_CONFIG`] to `path`.
///
/// # Errors
///
/// Returns [`GorocketError::ConfigExists`] if the file is already present,
/// or an I/O error if it cannot be written.
pub fn init_config(path: &Utf8Path) -> Result<()> {
    if path.exists() {
        return Err(GorocketError::ConfigExists {
            path: path.to_owned(),
        });
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    fn info() -> BuildInfo {
        BuildInfo::new("rocket", "v2.0.0")
    }

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG, &info()).expect("default config");
        assert_eq!(config.build.targets.len(), 3);
        assert_eq!(config.build.ldflags, "-s -w -X main.version=v2.0.0");
        assert!(config.tap().is_none());
    }

    #[test]
    fn module_variable_and_brew_section() {
        let source = concat!(
            "build:\n",
            "  ldflags: \"-X main.name={{ Module }}\"\n",
            "  targets:\n",
            "    - os: linux\n",
            "      arch: [amd64]\n",
            "brew:\n",
            "  repository:\n",
            "    owner: acme\n",
            "    name: homebrew-tap\n",
        );

        let config = Config::parse(source, &info()).expect("parse");

        assert_eq!(config.build.ldflags, "-X main.name=rocket");
        assert_eq!(config.tap(), Some(&RemoteRepository::new("acme", "homebrew-tap")));
    }

    #[test]
    fn ldflags_default_to_empty() {
        let source = "build:\n  targets:\n    - os: linux\n      arch: [arm64]\n";
        let config = Config::parse(source, &info()).expect("parse");
        assert!(config.build.ldflags.is_empty());
    }

    #[rstest]
    #[case::no_targets("build:\n  targets: []\n", "at least one target")]
    #[case::empty_arch("build:\n  targets:\n    - os: linux\n      arch: []\n", "no architectures")]
    #[case::unknown_variable(
        "build:\n  ldflags: \"{{ Commit }}\"\n  targets:\n    - os: linux\n      arch: [amd64]\n",
        "undefined"
    )]
    #[case::unknown_key(
        "build:\n  targets:\n    - os: linux\n      arch: [amd64]\n      goarm: 7\n",
        "goarm"
    )]
    fn invalid_configs_are_rejected(#[case] source: &str, #[case] fragment: &str) {
        let reason = Config::parse(source, &info()).expect_err("should be rejected");
        assert!(reason.contains(fragment), "{reason}");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8");
        let err = Config::load(&root.join(CONFIG_FILE_NAME), &info()).expect_err("missing");
        assert!(matches!(err, GorocketError::ConfigNotFound { .. }));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8");
        let path = root.join(CONFIG_FILE_NAME);

        init_config(&path).expect("first init");
        let err = init_config(&path).expect_err("second init");

        assert_eq!(err.to_string(), format!("{path} already exists"));
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            DEFAULT_CONFIG
        );
    }
}
