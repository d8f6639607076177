//! Declared resources and how they are referenced.
//!
//! A manifest is turned into [`DeclaredResource`] values: typed downloads,
//! generated cleanups, packages, and opaque host resources that only take
//! part in ordering. Each one carries its own reference and the references
//! it depends on.
//!
//! The `*Handler` types in the submodules adapt a declared resource to
//! [`declarative::Resource`] for a single run.

pub mod cleanup;
pub mod host;
pub mod package;
pub mod temporary_file;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use crate::error::TemporaryFileError;

pub use cleanup::{CleanupHandler, CleanupOutcome, TemporaryFileCleanup};
pub use host::{HostHandler, HostResource};
pub use package::{CommandPackageManager, Package, PackageHandler, PackageManager};
pub use temporary_file::{DownloadOutcome, TemporaryFile, TemporaryFileHandler};

pub const TEMPORARY_FILE: &str = "temporary_file";
pub const TEMPORARY_FILE_CLEANUP: &str = "temporary_file_cleanup";
pub const PACKAGE: &str = "package";

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_]*(?:::[A-Za-z][A-Za-z0-9_]*)*)\[(.+)\]$")
        .expect("reference pattern is valid")
});

/// `Kind[name]` reference to a declared resource.
///
/// Kinds compare case-insensitively (`Package[x]` and `package[x]` are the
/// same resource); names compare exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    kind: String,
    name: String,
}

impl ResourceRef {
    pub fn new(kind: &str, name: impl Into<String>) -> Self {
        Self {
            kind: kind.to_ascii_lowercase(),
            name: name.into(),
        }
    }

    /// Parse the `Kind[name]` form.
    pub fn parse(input: &str) -> Result<Self, TemporaryFileError> {
        let caps = REFERENCE_RE
            .captures(input.trim())
            .ok_or_else(|| TemporaryFileError::InvalidReference(input.to_string()))?;
        Ok(Self::new(&caps[1], &caps[2]))
    }

    /// Lowercase kind, e.g. `temporary_file`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self
            .kind
            .split("::")
            .map(capitalize)
            .collect::<Vec<_>>()
            .join("::");
        write!(f, "{kind}[{}]", self.name)
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Desired presence of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ensure::Present => write!(f, "present"),
            Ensure::Absent => write!(f, "absent"),
        }
    }
}

/// One entry of the resource catalog.
#[derive(Debug, Clone)]
pub enum DeclaredResource {
    Download(TemporaryFile),
    Cleanup(TemporaryFileCleanup),
    Package(Package),
    Host(HostResource),
}

impl DeclaredResource {
    pub fn reference(&self) -> &ResourceRef {
        match self {
            Self::Download(r) => &r.reference,
            Self::Cleanup(r) => &r.reference,
            Self::Package(r) => &r.reference,
            Self::Host(r) => &r.reference,
        }
    }

    pub fn kind(&self) -> &str {
        self.reference().kind()
    }

    /// Resources that must be applied before this one.
    pub fn depends_on(&self) -> &BTreeSet<ResourceRef> {
        match self {
            Self::Download(r) => &r.depends_on,
            Self::Cleanup(r) => &r.depends_on,
            Self::Package(r) => &r.depends_on,
            Self::Host(r) => &r.depends_on,
        }
    }

    /// Declared ensure value. Cleanups have none.
    pub fn ensure(&self) -> Option<Ensure> {
        match self {
            Self::Download(r) => Some(r.ensure),
            Self::Cleanup(_) => None,
            Self::Package(r) => Some(r.ensure),
            Self::Host(r) => r.ensure,
        }
    }

    pub fn depends_on_ref(&self, other: &ResourceRef) -> bool {
        self.depends_on().contains(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        let r = ResourceRef::parse("Package[curl]").unwrap();
        assert_eq!(r.kind(), "package");
        assert_eq!(r.name(), "curl");
        assert_eq!(r, ResourceRef::new(PACKAGE, "curl"));
    }

    #[test]
    fn test_parse_namespaced_kind_and_odd_names() {
        let r = ResourceRef::parse("Apt::Source[deb [arch=amd64] x]").unwrap();
        assert_eq!(r.kind(), "apt::source");
        assert_eq!(r.name(), "deb [arch=amd64] x");
        assert_eq!(r.to_string(), "Apt::Source[deb [arch=amd64] x]");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["curl", "Package[]", "[curl]", "Package curl", "9kind[x]"] {
            assert!(
                matches!(
                    ResourceRef::parse(bad),
                    Err(TemporaryFileError::InvalidReference(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_capitalizes_kind() {
        let r = ResourceRef::new(TEMPORARY_FILE_CLEANUP, "cleanup_jdk");
        assert_eq!(r.to_string(), "Temporary_file_cleanup[cleanup_jdk]");
    }

    #[test]
    fn test_kind_is_case_insensitive() {
        assert_eq!(
            ResourceRef::parse("temporary_file[x]").unwrap(),
            ResourceRef::parse("Temporary_File[x]").unwrap()
        );
        assert_ne!(
            ResourceRef::new(PACKAGE, "X"),
            ResourceRef::new(PACKAGE, "x")
        );
    }

    #[test]
    fn test_ensure_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            ensure: Ensure,
        }

        let w: Wrapper = toml::from_str("ensure = \"absent\"").unwrap();
        assert_eq!(w.ensure, Ensure::Absent);
        assert_eq!(Ensure::default(), Ensure::Present);
        assert_eq!(Ensure::Absent.to_string(), "absent");
    }
}
