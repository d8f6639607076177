//! Resource manifests
//!
//! A manifest lists resources as `[[resource]]` tables (TOML) or a
//! `resource` array (JSON):
//!
//! ```toml
//! [[resource]]
//! kind = "temporary_file"
//! name = "jdk"
//! source = "https://example.com/jdk-21.tar.gz"
//!
//! [[resource]]
//! kind = "package"
//! name = "jdk"
//! require = ["Temporary_file[jdk]"]
//! ```
//!
//! `kind`, `name`, `require` and `ensure` are common to every entry; the
//! rest are kind-specific attributes.

use anyhow::{Context, Result};
use fetchkit::FileSystem;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::engine::DeclaredCatalog;
use crate::error::TemporaryFileError;
use crate::resource::{
    DeclaredResource, Ensure, HostResource, PACKAGE, Package, ResourceRef, TEMPORARY_FILE,
    TEMPORARY_FILE_CLEANUP, TemporaryFile,
};

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceEntry {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub require: Vec<String>,
    #[serde(default)]
    pub ensure: Option<Ensure>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    /// Load a manifest, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let manifest = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        };
        manifest.with_context(|| format!("Invalid manifest {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate every entry and collect them into a catalog.
    ///
    /// `var_dir` is where downloads without a `path` are placed.
    pub fn declare(
        &self,
        var_dir: &Path,
        fs: &dyn FileSystem,
    ) -> Result<DeclaredCatalog, TemporaryFileError> {
        let mut catalog = DeclaredCatalog::new();
        for entry in &self.resources {
            catalog.declare(entry.to_declared(var_dir, fs)?)?;
        }
        Ok(catalog)
    }
}

impl ResourceEntry {
    fn to_declared(
        &self,
        var_dir: &Path,
        fs: &dyn FileSystem,
    ) -> Result<DeclaredResource, TemporaryFileError> {
        let kind = self.kind.to_ascii_lowercase();
        if self.name.is_empty() {
            return Err(self.invalid("name", "must not be empty"));
        }

        let depends_on = self
            .require
            .iter()
            .map(|r| ResourceRef::parse(r))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let resource = match kind.as_str() {
            TEMPORARY_FILE => {
                let source = self
                    .string_attr("source")?
                    .ok_or_else(|| self.invalid("source", "is required"))?;
                let file = TemporaryFile::declare(
                    &self.name,
                    source,
                    self.string_attr("path")?,
                    var_dir,
                    fs,
                )?;
                DeclaredResource::Download(
                    file.with_ensure(self.ensure.unwrap_or_default())
                        .with_depends_on(depends_on),
                )
            }
            TEMPORARY_FILE_CLEANUP => {
                return Err(TemporaryFileError::UndeclarableKind(kind));
            }
            PACKAGE => {
                let mut package = Package::new(&self.name)
                    .with_ensure(self.ensure.unwrap_or_default())
                    .with_depends_on(depends_on);
                if let Some(name) = self.string_attr("package")? {
                    package = package.with_package_name(name);
                }
                DeclaredResource::Package(package)
            }
            _ => DeclaredResource::Host(
                HostResource::new(&kind, &self.name)
                    .with_ensure(self.ensure)
                    .with_depends_on(depends_on)
                    .with_attributes(self.attributes.clone()),
            ),
        };
        Ok(resource)
    }

    fn string_attr(&self, key: &str) -> Result<Option<&str>, TemporaryFileError> {
        match self.attributes.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.invalid(key, "must be a string")),
        }
    }

    fn invalid(&self, attribute: &str, problem: &str) -> TemporaryFileError {
        TemporaryFileError::InvalidAttribute {
            resource: format!("{}[{}]", self.kind, self.name),
            attribute: attribute.to_string(),
            problem: problem.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchkit::LocalFs;
    use tempfile::TempDir;

    const TOML_MANIFEST: &str = r#"
[[resource]]
kind = "temporary_file"
name = "jdk"
source = "https://example.com/jdk.tar.gz"

[[resource]]
kind = "package"
name = "java"
package = "openjdk-21-jdk"
require = ["Temporary_file[jdk]"]

[[resource]]
kind = "exec"
name = "verify"
command = "java -version"
require = ["Package[java]"]
"#;

    #[test]
    fn test_parse_toml() {
        let manifest = Manifest::from_toml(TOML_MANIFEST).unwrap();

        assert_eq!(manifest.resources.len(), 3);
        assert_eq!(manifest.resources[1].require, vec!["Temporary_file[jdk]"]);
        assert_eq!(
            manifest.resources[2].attributes.get("command"),
            Some(&serde_json::json!("java -version"))
        );
    }

    #[test]
    fn test_parse_json() {
        let manifest = Manifest::from_json(
            r#"{"resource": [
                {"kind": "temporary_file", "name": "a", "source": "https://x/a", "ensure": "absent"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(manifest.resources[0].ensure, Some(Ensure::Absent));
    }

    #[test]
    fn test_load_by_extension() {
        let tmp = TempDir::new().unwrap();
        let toml_path = tmp.path().join("site.toml");
        let json_path = tmp.path().join("site.json");
        fs::write(&toml_path, TOML_MANIFEST).unwrap();
        fs::write(&json_path, r#"{"resource": []}"#).unwrap();

        assert_eq!(Manifest::load(&toml_path).unwrap().resources.len(), 3);
        assert!(Manifest::load(&json_path).unwrap().resources.is_empty());
        assert!(Manifest::load(&tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_declare_builds_typed_resources() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::from_toml(TOML_MANIFEST).unwrap();

        let catalog = manifest.declare(tmp.path(), &LocalFs).unwrap().expand();

        assert_eq!(catalog.len(), 4);
        let java = catalog.get(&ResourceRef::new(PACKAGE, "java")).unwrap();
        match java {
            DeclaredResource::Package(p) => assert_eq!(p.package_name, "openjdk-21-jdk"),
            other => panic!("expected package, got {other:?}"),
        }
        let verify = catalog.get(&ResourceRef::new("exec", "verify")).unwrap();
        assert!(matches!(verify, DeclaredResource::Host(_)));
        assert!(verify.depends_on_ref(&ResourceRef::new(PACKAGE, "java")));
    }

    #[test]
    fn test_missing_source_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::from_toml(
            r#"
[[resource]]
kind = "temporary_file"
name = "jdk"
"#,
        )
        .unwrap();

        let err = manifest.declare(tmp.path(), &LocalFs).unwrap_err();
        assert!(matches!(err, TemporaryFileError::InvalidAttribute { .. }));
        assert!(err.to_string().contains("source"));
    }

    #[test]
    fn test_non_string_path_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::from_toml(
            r#"
[[resource]]
kind = "temporary_file"
name = "jdk"
source = "https://example.com/jdk"
path = 42
"#,
        )
        .unwrap();

        assert!(manifest.declare(tmp.path(), &LocalFs).is_err());
    }

    #[test]
    fn test_cleanup_kind_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::from_toml(
            r#"
[[resource]]
kind = "Temporary_file_cleanup"
name = "cleanup_jdk"
"#,
        )
        .unwrap();

        assert!(matches!(
            manifest.declare(tmp.path(), &LocalFs),
            Err(TemporaryFileError::UndeclarableKind(_))
        ));
    }

    #[test]
    fn test_bad_reference_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::from_toml(
            r#"
[[resource]]
kind = "package"
name = "jdk"
require = ["jdk"]
"#,
        )
        .unwrap();

        assert!(matches!(
            manifest.declare(tmp.path(), &LocalFs),
            Err(TemporaryFileError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_package_ensure_defaults_to_present() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::from_toml(
            r#"
[[resource]]
kind = "package"
name = "curl"
"#,
        )
        .unwrap();

        let catalog = manifest.declare(tmp.path(), &LocalFs).unwrap().expand();
        let curl = catalog.get(&ResourceRef::new(PACKAGE, "curl")).unwrap();
        assert_eq!(curl.ensure(), Some(Ensure::Present));
    }
}
