//! `.tag-releaserc.json` loading and run settings.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::version::ReleaseType;

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE: &str = ".tag-releaserc.json";

/// Remote that releases are fetched from and pushed to.
pub const DEFAULT_REMOTE: &str = "upstream";

/// Release name, also used as the release commit message.
pub const DEFAULT_RELEASE_NAME: &str = "Updated l10n translations";

/// Upper bound on captured stdout per git command.
pub const DEFAULT_MAX_BUFFER: usize = 10 * 1024 * 1024;

/// One repository of the fleet, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    pub repo: String,
    /// Target l10n branch.
    pub branch: String,
    /// Whether this repository receives the QA bump.
    pub host: bool,
}

/// Validated configuration file.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    pub root_directory: PathBuf,
    pub repositories: Vec<RepositoryEntry>,
    pub remote: String,
    pub locale_paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    root_directory: Option<String>,
    #[serde(default)]
    l10n: Vec<RawEntry>,
    #[serde(default)]
    remote: Option<String>,
    #[serde(default)]
    locale_paths: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    repo: Option<String>,
    branch: Option<String>,
    #[serde(default)]
    host: Option<HostFlag>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostFlag {
    Bool(bool),
    Text(String),
}

impl ReleaseConfig {
    /// Path of the config file inside `dir`.
    pub fn locate(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|err| match err {
            ParseError::Json(source) => ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            },
            ParseError::Invalid(err) => err,
        })?;
        debug!(
            path = %path.display(),
            repositories = config.repositories.len(),
            "loaded release config"
        );
        Ok(config)
    }

    /// Parse and validate config JSON.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content).map_err(|err| match err {
            ParseError::Json(source) => ConfigError::Malformed {
                path: PathBuf::from(CONFIG_FILE),
                source,
            },
            ParseError::Invalid(err) => err,
        })
    }

    fn parse(content: &str) -> Result<Self, ParseError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(ParseError::Json)?;

        let root_directory = raw
            .root_directory
            .filter(|root| !root.trim().is_empty())
            .ok_or(ParseError::Invalid(ConfigError::EmptyRootDirectory))?;

        if raw.l10n.is_empty() {
            return Err(ParseError::Invalid(ConfigError::EmptyRepositoryList));
        }

        let repositories = raw
            .l10n
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.validate(index))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ParseError::Invalid)?;

        Ok(Self {
            root_directory: PathBuf::from(root_directory),
            repositories,
            remote: raw.remote.unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            locale_paths: raw.locale_paths.unwrap_or_else(default_locale_paths),
        })
    }
}

enum ParseError {
    Json(serde_json::Error),
    Invalid(ConfigError),
}

impl RawEntry {
    fn validate(self, index: usize) -> Result<RepositoryEntry, ConfigError> {
        let repo = self
            .repo
            .filter(|r| !r.is_empty())
            .ok_or(ConfigError::MissingField { index, field: "repo" })?;
        let branch = self
            .branch
            .filter(|b| !b.is_empty())
            .ok_or(ConfigError::MissingField {
                index,
                field: "branch",
            })?;
        let host = match self.host {
            None => false,
            Some(HostFlag::Bool(flag)) => flag,
            Some(HostFlag::Text(text)) => match text.as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(ConfigError::InvalidHostFlag { repo, value: text });
                }
            },
        };
        Ok(RepositoryEntry { repo, branch, host })
    }
}

fn default_locale_paths() -> Vec<String> {
    vec!["locale".to_string(), "nls".to_string(), "i18n".to_string()]
}

/// Settings threaded through every workflow step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub release_type: ReleaseType,
    /// Pre-release identifier, e.g. `l10n-oct-17`.
    pub identifier: String,
    pub release_name: String,
    pub verbose: bool,
    pub max_buffer: usize,
    pub remote: String,
    pub locale_paths: Vec<String>,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            release_type: ReleaseType::Preminor,
            identifier: prerelease_identifier(chrono::Local::now().date_naive()),
            release_name: DEFAULT_RELEASE_NAME.to_string(),
            verbose: false,
            max_buffer: DEFAULT_MAX_BUFFER,
            remote: DEFAULT_REMOTE.to_string(),
            locale_paths: default_locale_paths(),
        }
    }
}

impl ReleaseSettings {
    /// Default settings with the remote and locale paths taken from `config`.
    pub fn for_config(config: &ReleaseConfig) -> Self {
        Self {
            remote: config.remote.clone(),
            locale_paths: config.locale_paths.clone(),
            ..Self::default()
        }
    }
}

/// `l10n-<month>-<day>`, month as lowercase short name.
pub fn prerelease_identifier(date: NaiveDate) -> String {
    format!(
        "l10n-{}-{}",
        date.format("%b").to_string().to_lowercase(),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "rootDirectory": "/src/fleet",
        "l10n": [
            { "repo": "core-ui", "branch": "feature-l10n", "host": "false" },
            { "repo": "web-app", "branch": "feature-l10n", "host": "true" },
            { "repo": "widgets", "branch": "feature-l10n" }
        ]
    }"#;

    #[test]
    fn test_parse_valid_config_preserves_order() {
        let config = ReleaseConfig::from_json(VALID).unwrap();
        assert_eq!(config.root_directory, PathBuf::from("/src/fleet"));
        let repos: Vec<&str> = config.repositories.iter().map(|r| r.repo.as_str()).collect();
        assert_eq!(repos, vec!["core-ui", "web-app", "widgets"]);
        assert!(!config.repositories[0].host);
        assert!(config.repositories[1].host);
        assert!(!config.repositories[2].host);
        assert_eq!(config.remote, "upstream");
        assert_eq!(config.locale_paths, vec!["locale", "nls", "i18n"]);
    }

    #[test]
    fn test_host_accepts_json_bool() {
        let config = ReleaseConfig::from_json(
            r#"{"rootDirectory": "/r", "l10n": [{"repo": "a", "branch": "b", "host": true}]}"#,
        )
        .unwrap();
        assert!(config.repositories[0].host);
    }

    #[test]
    fn test_invalid_host_flag_rejected() {
        let err = ReleaseConfig::from_json(
            r#"{"rootDirectory": "/r", "l10n": [{"repo": "a", "branch": "b", "host": "yes"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHostFlag { ref repo, .. } if repo == "a"));
    }

    #[test]
    fn test_empty_repository_list_rejected() {
        let err = ReleaseConfig::from_json(r#"{"rootDirectory": "/r", "l10n": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyRepositoryList));
    }

    #[test]
    fn test_missing_root_directory_rejected() {
        let err =
            ReleaseConfig::from_json(r#"{"l10n": [{"repo": "a", "branch": "b"}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyRootDirectory));
    }

    #[test]
    fn test_missing_branch_rejected() {
        let err = ReleaseConfig::from_json(r#"{"rootDirectory": "/r", "l10n": [{"repo": "a"}]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                index: 0,
                field: "branch"
            }
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = ReleaseConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReleaseConfig::load(&ReleaseConfig::locate(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), VALID).unwrap();
        let config = ReleaseConfig::load(&ReleaseConfig::locate(dir.path())).unwrap();
        assert_eq!(config.repositories.len(), 3);
    }

    #[test]
    fn test_prerelease_identifier_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 7).unwrap();
        assert_eq!(prerelease_identifier(date), "l10n-oct-7");
    }

    #[test]
    fn test_settings_take_remote_from_config() {
        let config = ReleaseConfig::from_json(
            r#"{"rootDirectory": "/r", "remote": "origin", "localePaths": ["src/nls"],
                "l10n": [{"repo": "a", "branch": "b"}]}"#,
        )
        .unwrap();
        let settings = ReleaseSettings::for_config(&config);
        assert_eq!(settings.remote, "origin");
        assert_eq!(settings.locale_paths, vec!["src/nls"]);
        assert_eq!(settings.release_type, ReleaseType::Preminor);
        assert_eq!(settings.release_name, DEFAULT_RELEASE_NAME);
    }
}
