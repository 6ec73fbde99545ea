//! package.json access: version, visibility and dependency ranges.
//!
//! Key order is preserved on write (serde_json `preserve_order`).

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{StepError, StepResult};

const DEPENDENCY_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// A loaded package.json document.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    doc: Value,
}

impl Manifest {
    pub fn load(path: &Path) -> StepResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StepError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> StepResult<Self> {
        let doc: Value = serde_json::from_str(content).map_err(|e| StepError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !doc.is_object() {
            return Err(StepError::Manifest {
                path: path.to_path_buf(),
                reason: "top level is not an object".to_string(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> StepResult<&str> {
        self.doc
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| StepError::Manifest {
                path: self.path.clone(),
                reason: "missing string field `version`".to_string(),
            })
    }

    pub fn is_private(&self) -> bool {
        self.doc
            .get("private")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_version(&mut self, version: &str) {
        if let Some(obj) = self.doc.as_object_mut() {
            obj.insert("version".to_string(), Value::String(version.to_string()));
        }
    }

    /// Point every declared range for `pkg` at `version`, keeping a leading
    /// `^` or `~`. Returns whether any section declared the package.
    pub fn update_dependency(&mut self, pkg: &str, version: &str) -> bool {
        let mut updated = false;
        for section in DEPENDENCY_SECTIONS {
            let Some(deps) = self.doc.get_mut(section).and_then(Value::as_object_mut) else {
                continue;
            };
            if let Some(range) = deps.get_mut(pkg) {
                let prefix = range
                    .as_str()
                    .and_then(|r| r.chars().next())
                    .filter(|c| *c == '^' || *c == '~')
                    .map(String::from)
                    .unwrap_or_default();
                *range = Value::String(format!("{prefix}{version}"));
                updated = true;
            }
        }
        updated
    }

    /// Declared range for `pkg`, searching sections in order.
    pub fn dependency(&self, pkg: &str) -> Option<&str> {
        DEPENDENCY_SECTIONS
            .iter()
            .filter_map(|section| self.doc.get(*section))
            .find_map(|deps| deps.get(pkg))
            .and_then(Value::as_str)
    }

    pub fn to_json(&self) -> StepResult<String> {
        let mut text = serde_json::to_string_pretty(&self.doc)?;
        text.push('\n');
        Ok(text)
    }

    pub fn save(&self) -> StepResult<()> {
        std::fs::write(&self.path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKG: &str = r#"{
  "name": "web-app",
  "version": "3.2.0",
  "private": true,
  "dependencies": {
    "core-ui": "^1.4.0",
    "lodash": "4.17.21"
  },
  "devDependencies": {
    "widgets": "~0.9.1"
  }
}"#;

    fn manifest() -> Manifest {
        Manifest::parse(Path::new("package.json"), PKG).unwrap()
    }

    #[test]
    fn test_reads_version_and_private() {
        let m = manifest();
        assert_eq!(m.version().unwrap(), "3.2.0");
        assert!(m.is_private());
    }

    #[test]
    fn test_missing_private_is_public() {
        let m = Manifest::parse(Path::new("p.json"), r#"{"version": "1.0.0"}"#).unwrap();
        assert!(!m.is_private());
    }

    #[test]
    fn test_missing_version_is_error() {
        let m = Manifest::parse(Path::new("p.json"), r#"{"name": "x"}"#).unwrap();
        assert!(matches!(m.version(), Err(StepError::Manifest { .. })));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Manifest::parse(Path::new("p.json"), "[1, 2]").is_err());
    }

    #[test]
    fn test_update_dependency_keeps_prefix() {
        let mut m = manifest();
        assert!(m.update_dependency("core-ui", "1.5.0-l10n-oct-17.0"));
        assert!(m.update_dependency("widgets", "0.10.0"));
        assert!(!m.update_dependency("not-there", "1.0.0"));
        assert_eq!(m.dependency("core-ui"), Some("^1.5.0-l10n-oct-17.0"));
        assert_eq!(m.dependency("widgets"), Some("~0.10.0"));
        assert_eq!(m.dependency("lodash"), Some("4.17.21"));
    }

    #[test]
    fn test_write_preserves_key_order() {
        let mut m = manifest();
        m.set_version("3.3.0");
        let json = m.to_json().unwrap();
        let name = json.find("\"name\"").unwrap();
        let version = json.find("\"version\"").unwrap();
        let deps = json.find("\"dependencies\"").unwrap();
        assert!(name < version && version < deps);
        assert!(json.contains("\"version\": \"3.3.0\""));
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, PKG).unwrap();

        let mut m = Manifest::load(&path).unwrap();
        m.set_version("4.0.0");
        m.save().unwrap();

        assert_eq!(Manifest::load(&path).unwrap().version().unwrap(), "4.0.0");
    }
}
