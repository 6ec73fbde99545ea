//! Release types, manifest version bumps and tag/version conversions.

use std::fmt;
use std::str::FromStr;

use semver::{Prerelease, Version};

use crate::error::{ConfigError, StepError, StepResult};

/// Kind of version increment applied by the release workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    Premajor,
    Preminor,
    Prepatch,
    Prerelease,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::Premajor => "premajor",
            ReleaseType::Preminor => "preminor",
            ReleaseType::Prepatch => "prepatch",
            ReleaseType::Prerelease => "prerelease",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(ReleaseType::Major),
            "minor" => Ok(ReleaseType::Minor),
            "patch" => Ok(ReleaseType::Patch),
            "premajor" => Ok(ReleaseType::Premajor),
            "preminor" => Ok(ReleaseType::Preminor),
            "prepatch" => Ok(ReleaseType::Prepatch),
            "prerelease" => Ok(ReleaseType::Prerelease),
            _ => Err(ConfigError::UnknownReleaseType(s.to_string())),
        }
    }
}

/// Parse a manifest version string.
pub fn parse_version(version: &str) -> StepResult<Version> {
    Version::parse(version.trim()).map_err(|source| StepError::Version {
        version: version.to_string(),
        source,
    })
}

/// Increment `current` following npm's semver rules.
///
/// Pre-release kinds append `<identifier>.0`; `prerelease` on an existing
/// pre-release with the same identifier bumps its trailing counter.
pub fn bump(current: &Version, kind: ReleaseType, identifier: &str) -> StepResult<Version> {
    let mut next = current.clone();
    let is_pre = !current.pre.is_empty();
    next.build = semver::BuildMetadata::EMPTY;

    match kind {
        ReleaseType::Major => {
            if !(is_pre && current.minor == 0 && current.patch == 0) {
                next.major += 1;
            }
            next.minor = 0;
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Minor => {
            if !(is_pre && current.patch == 0) {
                next.minor += 1;
            }
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Patch => {
            if !is_pre {
                next.patch += 1;
            }
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Premajor => {
            next.major += 1;
            next.minor = 0;
            next.patch = 0;
            next.pre = prerelease(identifier, 0)?;
        }
        ReleaseType::Preminor => {
            next.minor += 1;
            next.patch = 0;
            next.pre = prerelease(identifier, 0)?;
        }
        ReleaseType::Prepatch => {
            next.patch += 1;
            next.pre = prerelease(identifier, 0)?;
        }
        ReleaseType::Prerelease => {
            if is_pre {
                next.pre = next_prerelease(&current.pre, identifier)?;
            } else {
                next.patch += 1;
                next.pre = prerelease(identifier, 0)?;
            }
        }
    }

    Ok(next)
}

fn prerelease(identifier: &str, counter: u64) -> StepResult<Prerelease> {
    let text = format!("{identifier}.{counter}");
    Prerelease::new(&text).map_err(|source| StepError::Version {
        version: text,
        source,
    })
}

fn next_prerelease(current: &Prerelease, identifier: &str) -> StepResult<Prerelease> {
    let text = current.as_str();
    if let Some(rest) = text.strip_prefix(identifier).and_then(|r| r.strip_prefix('.')) {
        if let Ok(counter) = rest.parse::<u64>() {
            return prerelease(identifier, counter + 1);
        }
    }
    prerelease(identifier, 0)
}

/// Tag name for a released version.
pub fn tag_for(version: &Version) -> String {
    format!("v{version}")
}

/// Version carried by a tag: everything after its first `v`.
///
/// `v2.10.1` gives `2.10.1` and `my-v3.0.0` gives `3.0.0`; a tag without any
/// `v` is returned whole.
pub fn dependency_version(tag: &str) -> &str {
    match tag.find('v') {
        Some(index) => &tag[index + 1..],
        None => tag,
    }
}
