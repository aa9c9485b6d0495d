//! package.json manifest editing
//!
//! Only the dependency sections are touched. Key order, the indentation of
//! the original file and its line endings are kept when writing back.
//!
//! ```json
//! {
//!   "name": "my-package",
//!   "dependencies": {
//!     "chalk": "^5.0.0"
//!   },
//!   "devDependencies": {
//!     "jest": "^29.0.0"
//!   }
//! }
//! ```

use nodemod_foundation::text::{detect_eol, detect_indent};
use nodemod_foundation::{Indent, NodemodError, NodemodResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the manifest
pub const PACKAGE_JSON: &str = "package.json";

/// A dependency table of package.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencySection {
    Dependencies,
    DevDependencies,
    PeerDependencies,
    OptionalDependencies,
}

impl DependencySection {
    pub const ALL: [DependencySection; 4] = [
        DependencySection::Dependencies,
        DependencySection::DevDependencies,
        DependencySection::PeerDependencies,
        DependencySection::OptionalDependencies,
    ];

    /// Key of the section in package.json
    pub fn key(&self) -> &'static str {
        match self {
            DependencySection::Dependencies => "dependencies",
            DependencySection::DevDependencies => "devDependencies",
            DependencySection::PeerDependencies => "peerDependencies",
            DependencySection::OptionalDependencies => "optionalDependencies",
        }
    }
}

/// A parsed package.json
#[derive(Debug, Clone)]
pub struct PackageJson {
    root: Map<String, Value>,
    indent: Indent,
    eol: &'static str,
}

impl PackageJson {
    /// Parse package.json content
    pub fn parse(content: &str) -> NodemodResult<Self> {
        let json: Value = serde_json::from_str(content)?;
        let Value::Object(root) = json else {
            return Err(NodemodError::invalid_input(
                "package.json root must be an object",
            ));
        };

        Ok(Self {
            root,
            indent: detect_indent(content),
            eol: detect_eol(content),
        })
    }

    /// Read and parse the package.json at `path`
    pub async fn load(path: &Path) -> NodemodResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Write the manifest back to `path`
    pub async fn save(&self, path: &Path) -> NodemodResult<()> {
        tokio::fs::write(path, self.to_json_string()?).await?;
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.root.get("name").and_then(Value::as_str)
    }

    /// The corepack `packageManager` field, e.g. `pnpm@9.1.0`
    pub fn package_manager_field(&self) -> Option<&str> {
        self.root.get("packageManager").and_then(Value::as_str)
    }

    fn section(&self, section: DependencySection) -> Option<&Map<String, Value>> {
        self.root.get(section.key()).and_then(Value::as_object)
    }

    /// Section and version specifier of `name`, first match in section order
    pub fn dependency(&self, name: &str) -> Option<(DependencySection, &str)> {
        DependencySection::ALL.iter().find_map(|section| {
            let version = self.section(*section)?.get(name)?.as_str().unwrap_or("*");
            Some((*section, version))
        })
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependency(name).is_some()
    }

    /// All dependency names of `section`, in file order
    pub fn dependency_names(&self, section: DependencySection) -> Vec<&str> {
        self.section(section)
            .map(|deps| deps.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Add or update a dependency. Returns whether anything changed.
    pub fn add_dependency(&mut self, section: DependencySection, name: &str, version: &str) -> bool {
        let entry = self
            .root
            .entry(section.key())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(deps) = entry else {
            debug!(section = section.key(), "Dependency section is not an object");
            return false;
        };

        if deps.get(name).and_then(Value::as_str) == Some(version) {
            return false;
        }
        deps.insert(name.to_string(), Value::String(version.to_string()));
        debug!(dependency = name, version, section = section.key(), "Added dependency");
        true
    }

    /// Remove `name` from every dependency section. Returns whether it was
    /// present.
    pub fn remove_dependency(&mut self, name: &str) -> bool {
        let mut removed = false;
        for section in DependencySection::ALL {
            if let Some(Value::Object(deps)) = self.root.get_mut(section.key()) {
                if deps.shift_remove(name).is_some() {
                    debug!(dependency = name, section = section.key(), "Removed dependency");
                    removed = true;
                }
            }
        }
        removed
    }

    /// Serialize with the original indentation and line endings and a
    /// trailing line break
    pub fn to_json_string(&self) -> NodemodResult<String> {
        let indent = self.indent.unit();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.root.serialize(&mut serializer)?;

        let mut out = String::from_utf8(buf)
            .map_err(|e| NodemodError::internal(format!("Invalid UTF-8 in JSON output: {}", e)))?;
        if self.eol != "\n" {
            out = out.replace('\n', self.eol);
        }
        out.push_str(self.eol);
        Ok(out)
    }
}

/// The nearest package.json at or above `start`
pub fn find_package_json(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PACKAGE_JSON))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"{
  "name": "demo",
  "version": "1.0.0",
  "dependencies": {
    "chalk": "^5.3.0",
    "lodash": "^4.17.21"
  },
  "devDependencies": {
    "jest": "^29.7.0"
  }
}
"#;

    #[test]
    fn test_parse_and_lookup() {
        let manifest = PackageJson::parse(MANIFEST).unwrap();
        assert_eq!(manifest.name(), Some("demo"));
        assert_eq!(
            manifest.dependency("jest"),
            Some((DependencySection::DevDependencies, "^29.7.0"))
        );
        assert!(manifest.has_dependency("chalk"));
        assert!(!manifest.has_dependency("react"));
        assert_eq!(
            manifest.dependency_names(DependencySection::Dependencies),
            vec!["chalk", "lodash"]
        );
    }

    #[test]
    fn test_remove_dependency_keeps_order_and_format() {
        let mut manifest = PackageJson::parse(MANIFEST).unwrap();
        assert!(manifest.remove_dependency("chalk"));
        assert_eq!(
            manifest.to_json_string().unwrap(),
            r#"{
  "name": "demo",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.21"
  },
  "devDependencies": {
    "jest": "^29.7.0"
  }
}
"#
        );
    }

    #[test]
    fn test_remove_missing_dependency_is_noop() {
        let mut manifest = PackageJson::parse(MANIFEST).unwrap();
        assert!(!manifest.remove_dependency("react"));
        assert_eq!(manifest.to_json_string().unwrap(), MANIFEST);
    }

    #[test]
    fn test_add_dependency_creates_section() {
        let mut manifest = PackageJson::parse("{\n    \"name\": \"demo\"\n}\n").unwrap();
        assert!(manifest.add_dependency(DependencySection::DevDependencies, "typescript", "^5.0.0"));
        assert!(!manifest.add_dependency(DependencySection::DevDependencies, "typescript", "^5.0.0"));
        assert_eq!(
            manifest.to_json_string().unwrap(),
            "{\n    \"name\": \"demo\",\n    \"devDependencies\": {\n        \"typescript\": \"^5.0.0\"\n    }\n}\n"
        );
    }

    #[test]
    fn test_crlf_is_preserved() {
        let manifest = PackageJson::parse("{\r\n  \"name\": \"demo\"\r\n}\r\n").unwrap();
        assert_eq!(
            manifest.to_json_string().unwrap(),
            "{\r\n  \"name\": \"demo\"\r\n}\r\n"
        );
    }

    #[test]
    fn test_root_must_be_object() {
        let err = PackageJson::parse("[]").unwrap_err();
        assert!(matches!(err, NodemodError::InvalidInput { .. }));
    }

    #[test]
    fn test_find_package_json_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PACKAGE_JSON), "{}").unwrap();
        let nested = dir.path().join("src").join("lib");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            find_package_json(&nested),
            Some(dir.path().join(PACKAGE_JSON))
        );
    }

    #[tokio::test]
    async fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PACKAGE_JSON);
        tokio::fs::write(&path, MANIFEST).await.unwrap();

        let mut manifest = PackageJson::load(&path).await.unwrap();
        manifest.remove_dependency("jest");
        manifest.save(&path).await.unwrap();

        let saved = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!saved.contains("jest"));
        assert!(saved.contains("\"devDependencies\": {}"));
    }
}
