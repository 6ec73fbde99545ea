//! `tag-release-l10n`: coordinated l10n pre-releases across a fleet of
//! repositories.
//!
//! Without flags every configured repository is synced, released when it has
//! locale or dev changes, and the first host repository is bumped to the new
//! tags. `--check` only reports which repositories have pending changes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use l10n_release_core::config::DEFAULT_MAX_BUFFER;
use l10n_release_core::reporting;
use l10n_release_core::telemetry::{init_tracing, level_for};
use l10n_release_core::{
    default_workflows, GitProbe, Orchestrator, ReleaseConfig, ReleaseSettings, ReleaseType,
    RunMode, RunReport, TracingProgressFactory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "tag-release-l10n")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pre-release l10n changes across many repositories", long_about = None)]
struct Cli {
    /// Only report pending changes; nothing is checked out, tagged or pushed
    #[arg(short, long)]
    check: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Report format printed on stdout
    #[arg(long, value_enum, default_value = "table")]
    format: Format,

    /// Directory holding .tag-releaserc.json (default: current directory)
    #[arg(short, long, env = "TR_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Explicit config file; overrides --directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Release type used for the version bump
    #[arg(short, long, default_value = "preminor")]
    release: ReleaseType,

    /// Pre-release identifier (default: l10n-<month>-<day>)
    #[arg(short, long)]
    identifier: Option<String>,

    /// Maximum bytes of git output accepted per command
    #[arg(long = "maxbuffer", default_value_t = DEFAULT_MAX_BUFFER)]
    max_buffer: usize,
}

impl Cli {
    fn mode(&self) -> RunMode {
        if self.check {
            RunMode::Check
        } else {
            RunMode::Live
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        let dir = match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to resolve current directory")?,
        };
        Ok(ReleaseConfig::locate(&dir))
    }

    fn settings(&self, config: &ReleaseConfig) -> ReleaseSettings {
        let defaults = ReleaseSettings::for_config(config);
        ReleaseSettings {
            release_type: self.release,
            identifier: self.identifier.clone().unwrap_or(defaults.identifier.clone()),
            verbose: self.verbose,
            max_buffer: self.max_buffer,
            ..defaults
        }
    }
}

fn print_report(report: &RunReport, format: Format) -> Result<()> {
    match format {
        Format::Table => print!("{}", reporting::render(report)),
        Format::Json => println!(
            "{}",
            reporting::render_json(report).context("Failed to serialize report")?
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json, level_for(cli.verbose));

    let path = cli.config_path()?;
    let config = ReleaseConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    let settings = cli.settings(&config);
    info!(
        root = %config.root_directory.display(),
        repositories = config.repositories.len(),
        release = %settings.release_type,
        identifier = %settings.identifier,
        "starting l10n release"
    );

    let probe = Arc::new(GitProbe::new(settings.remote.clone(), settings.max_buffer));
    let orchestrator = Orchestrator::new(
        config,
        settings,
        default_workflows(),
        probe,
        Arc::new(TracingProgressFactory),
    );

    let report = orchestrator
        .run(cli.mode())
        .await
        .context("l10n release aborted")?;
    print_report(&report, cli.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ReleaseConfig {
        ReleaseConfig::from_json(
            r#"{
                "rootDirectory": "/fleet",
                "remote": "origin",
                "l10n": [{ "repo": "core-ui", "branch": "feature-l10n" }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["tag-release-l10n", "--config", "/tmp/rc.json"]).unwrap();
        assert_eq!(cli.mode(), RunMode::Live);
        assert_eq!(cli.format, Format::Table);
        assert_eq!(cli.release, ReleaseType::Preminor);
        assert_eq!(cli.max_buffer, DEFAULT_MAX_BUFFER);
        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/tmp/rc.json"));
    }

    #[test]
    fn test_check_mode_and_overrides() {
        let cli = Cli::try_parse_from([
            "tag-release-l10n",
            "--check",
            "--release",
            "PrePatch",
            "--identifier",
            "l10n-oct-17",
            "--maxbuffer",
            "2048",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.mode(), RunMode::Check);
        assert_eq!(cli.format, Format::Json);

        let settings = cli.settings(&config());
        assert_eq!(settings.release_type, ReleaseType::Prepatch);
        assert_eq!(settings.identifier, "l10n-oct-17");
        assert_eq!(settings.max_buffer, 2048);
        assert_eq!(settings.remote, "origin");
    }

    #[test]
    fn test_unknown_release_type_rejected() {
        let err = Cli::try_parse_from(["tag-release-l10n", "--release", "huge"]).unwrap_err();
        assert!(err.to_string().contains("huge"));
    }

    #[test]
    fn test_directory_locates_config() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "tag-release-l10n",
            "--directory",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(
            cli.config_path().unwrap(),
            dir.path().join(".tag-releaserc.json")
        );
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
