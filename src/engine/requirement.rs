//! Does any other resource need a download right now?

use crate::resource::{DeclaredResource, Ensure, Package, PackageManager, ResourceRef};

/// Whether some other resource in `resources` depends on `candidate` and
/// would actually make use of it.
///
/// A dependent does not count when it is:
/// - a generated cleanup (it only exists because of the download),
/// - a package with `ensure = absent` (nothing to install from the file),
/// - a package with `ensure = present` that is already installed.
///
/// Package state is read at call time, so the answer reflects whatever the
/// run has done up to this point.
pub fn is_required(
    candidate: &ResourceRef,
    resources: &[DeclaredResource],
    packages: &dyn PackageManager,
) -> bool {
    resources
        .iter()
        .filter(|resource| resource.reference() != candidate)
        .filter(|resource| resource.depends_on_ref(candidate))
        .any(|resource| wants(resource, candidate, packages))
}

fn wants(
    resource: &DeclaredResource,
    candidate: &ResourceRef,
    packages: &dyn PackageManager,
) -> bool {
    match resource {
        DeclaredResource::Cleanup(_) => false,
        DeclaredResource::Package(package) => match package.ensure {
            Ensure::Absent => {
                log::debug!("{} ignores {candidate}: package is being removed", package.reference);
                false
            }
            Ensure::Present => !already_installed(package, packages),
        },
        DeclaredResource::Download(_) | DeclaredResource::Host(_) => true,
    }
}

// A failed query counts as "not installed": fetching too much beats
// starving an install.
fn already_installed(package: &Package, packages: &dyn PackageManager) -> bool {
    match packages.is_installed(&package.package_name) {
        Ok(installed) => {
            if installed {
                log::debug!("{} is already installed", package.reference);
            }
            installed
        }
        Err(e) => {
            log::warn!(
                "Could not query {}: {e:#}; treating it as not installed",
                package.reference
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::package::MemoryPackages;
    use crate::resource::{HostResource, TEMPORARY_FILE, TemporaryFile, TemporaryFileCleanup};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn candidate() -> ResourceRef {
        ResourceRef::new(TEMPORARY_FILE, "jdk")
    }

    fn host(kind: &str, name: &str, deps: &[ResourceRef]) -> DeclaredResource {
        DeclaredResource::Host(HostResource::new(kind, name).with_depends_on(deps.iter().cloned()))
    }

    fn package(name: &str, ensure: Ensure, deps: &[ResourceRef]) -> DeclaredResource {
        DeclaredResource::Package(
            Package::new(name)
                .with_ensure(ensure)
                .with_depends_on(deps.iter().cloned()),
        )
    }

    #[test]
    fn test_no_dependents_is_not_required() {
        let packages = MemoryPackages::new();
        let resources = vec![host("exec", "unrelated", &[])];

        assert!(!is_required(&candidate(), &resources, &packages));
        assert!(!is_required(&candidate(), &[], &packages));
    }

    #[test]
    fn test_self_edge_does_not_require() {
        let packages = MemoryPackages::new();
        let own = TemporaryFile::at("jdk", "https://example.com/jdk", PathBuf::from("/tmp/jdk"))
            .with_depends_on([candidate()]);
        let resources = vec![DeclaredResource::Download(own)];

        assert!(!is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_host_dependent_requires() {
        let packages = MemoryPackages::new();
        let resources = vec![host("exec", "install-jdk", &[candidate()])];

        assert!(is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_cleanup_dependent_is_ignored() {
        let packages = MemoryPackages::new();
        let cleanup = TemporaryFileCleanup {
            reference: ResourceRef::new(crate::resource::TEMPORARY_FILE_CLEANUP, "cleanup_jdk"),
            path: PathBuf::from("/tmp/jdk"),
            source: None,
            depends_on: BTreeSet::from([candidate()]),
        };
        let resources = vec![DeclaredResource::Cleanup(cleanup)];

        assert!(!is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_package_being_removed_is_ignored() {
        let packages = MemoryPackages::new();
        let resources = vec![package("jdk", Ensure::Absent, &[candidate()])];

        assert!(!is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_installed_package_is_ignored() {
        let packages = MemoryPackages::with_installed(["jdk"]);
        let resources = vec![package("jdk", Ensure::Present, &[candidate()])];

        assert!(!is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_missing_package_requires() {
        let packages = MemoryPackages::new();
        let resources = vec![package("jdk", Ensure::Present, &[candidate()])];

        assert!(is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_failed_query_counts_as_missing() {
        let packages = MemoryPackages::new();
        packages.fail_queries();
        let resources = vec![package("jdk", Ensure::Present, &[candidate()])];

        assert!(is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_any_remaining_dependent_is_enough() {
        let packages = MemoryPackages::with_installed(["jdk"]);
        let resources = vec![
            package("jdk", Ensure::Present, &[candidate()]),
            host("exec", "verify", &[candidate()]),
        ];

        assert!(is_required(&candidate(), &resources, &packages));
    }

    #[test]
    fn test_packages_not_depending_are_never_queried() {
        let packages = MemoryPackages::new();
        let resources = vec![package("other", Ensure::Present, &[])];

        assert!(!is_required(&candidate(), &resources, &packages));
        assert_eq!(packages.query_count(), 0);
    }
}
