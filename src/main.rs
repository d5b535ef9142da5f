//! gorocket CLI entrypoint.
//!
//! This binary builds release archives for every configured platform and,
//! on `release`, publishes them to GitHub. Progress goes to stderr; only
//! `version` writes to stdout.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use gorocket::cli::{Cli, Command, ReleaseArgs};
use gorocket::config::{CONFIG_FILE_NAME, init_config};
use gorocket::error::{GorocketError, Result};
use gorocket::exec::SystemCommandExecutor;
use gorocket::github::client::GitHubClient;
use gorocket::logging::init_logging;
use gorocket::output::write_line;
use gorocket::pipeline::{Pipeline, ProjectLayout};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    if let Err(err) = init_logging(cli.verbosity, cli.quiet) {
        write_stderr_line(&mut stderr, format!("warning: logging not initialised: {err}"));
    }
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let mut sink = std::io::sink();
    let progress: &mut dyn Write = if cli.quiet { &mut sink } else { stderr };
    let layout = resolve_layout(cli)?;

    match &cli.command {
        Command::Init => {
            init_config(&layout.config_path())?;
            write_line(progress, format!("Created {CONFIG_FILE_NAME}"));
        }
        Command::Version => {
            write_line(
                &mut std::io::stdout(),
                format!("gorocket {}", env!("CARGO_PKG_VERSION")),
            );
        }
        Command::Build(args) => {
            let executor = SystemCommandExecutor::in_dir(layout.root.clone());
            Pipeline::new(layout, &executor)
                .with_repository_override(cli.repository.clone())
                .build(args.clean, progress)?;
        }
        Command::Release(args) => {
            let token = require_token(args)?;
            let host = GitHubClient::new(token);
            let executor = SystemCommandExecutor::in_dir(layout.root.clone());
            Pipeline::new(layout, &executor)
                .with_repository_override(cli.repository.clone())
                .release(&host, args.clean, args.draft, progress)?;
        }
    }
    Ok(())
}

/// Returns the API token, refusing an absent or empty one.
fn require_token(args: &ReleaseArgs) -> Result<String> {
    args.github_token
        .clone()
        .filter(|token| !token.is_empty())
        .ok_or(GorocketError::MissingToken)
}

/// Anchors the project and output directories to the current directory.
///
/// Commands run inside the project root, so both paths must be absolute.
fn resolve_layout(cli: &Cli) -> Result<ProjectLayout> {
    let root = absolute(&cli.project_dir)?;
    let dist_dir = absolute(&cli.resolved_dist_dir())?;
    Ok(ProjectLayout::new(root).with_dist_dir(dist_dir))
}

fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let absolute = std::path::absolute(path)?;
    Utf8PathBuf::try_from(absolute).map_err(|err| GorocketError::NonUtf8Path {
        path: err.into_path_buf().to_string_lossy().into_owned(),
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    write_line(stderr, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        temp_env::with_vars_unset(["GITHUB_REPOSITORY", "GITHUB_TOKEN"], || {
            Cli::try_parse_from(args).expect("arguments should parse")
        })
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(GorocketError::MissingToken), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: a GitHub token is required"));
    }

    #[test]
    fn release_without_token_fails_before_building() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().to_str().expect("utf8 temp dir");
        let cli = cli(&["gorocket", "release", "--project-dir", root]);

        let err = run(&cli, &mut Vec::new()).expect_err("token is required");

        assert!(matches!(err, GorocketError::MissingToken));
    }

    #[test]
    fn empty_token_is_rejected() {
        let args = ReleaseArgs {
            github_token: Some(String::new()),
            ..ReleaseArgs::default()
        };
        assert!(matches!(
            require_token(&args),
            Err(GorocketError::MissingToken)
        ));
    }

    #[test]
    fn init_writes_config_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().to_str().expect("utf8 temp dir");
        let cli = cli(&["gorocket", "init", "--project-dir", root]);

        let mut progress = Vec::new();
        run(&cli, &mut progress).expect("first init");
        assert_eq!(progress, b"Created .gorocket.yaml\n");
        assert!(dir.path().join(CONFIG_FILE_NAME).is_file());

        let err = run(&cli, &mut Vec::new()).expect_err("second init");
        assert!(matches!(err, GorocketError::ConfigExists { .. }));
    }

    #[test]
    fn relative_dirs_are_made_absolute() {
        let cli = cli(&["gorocket", "build", "--project-dir", "rocket"]);
        let layout = resolve_layout(&cli).expect("layout");
        assert!(layout.root.is_absolute());
        assert!(layout.dist_dir.ends_with("rocket/dist"));
    }
}
