//! Builds the cleanup that follows every download.

use std::collections::BTreeSet;

use crate::resource::{
    DeclaredResource, ResourceRef, TEMPORARY_FILE_CLEANUP, TemporaryFile, TemporaryFileCleanup,
};

/// Name of the cleanup generated for the download `name`.
pub fn cleanup_name(name: &str) -> String {
    format!("cleanup_{name}")
}

/// Cleanup for `download`, ordered after it and after every resource in
/// `resources` that depends on it.
///
/// Other downloads and cleanups are never counted as dependents. Packages
/// are, whatever their state: the cleanup must wait for any consumer, even
/// one that ends up not needing the file.
pub fn generate_cleanup(
    download: &TemporaryFile,
    resources: &[DeclaredResource],
) -> TemporaryFileCleanup {
    let target = download.reference();

    let mut depends_on = BTreeSet::from([target.clone()]);
    depends_on.extend(
        resources
            .iter()
            .filter(|r| {
                r.kind() != target.kind()
                    && r.kind() != TEMPORARY_FILE_CLEANUP
                    && r.depends_on_ref(target)
            })
            .map(|r| r.reference().clone()),
    );

    log::debug!(
        "Generated cleanup for {target} after {} resource(s)",
        depends_on.len()
    );

    TemporaryFileCleanup {
        reference: ResourceRef::new(TEMPORARY_FILE_CLEANUP, cleanup_name(download.name())),
        path: download.path.clone(),
        source: Some(download.source.clone()),
        depends_on,
    }
}
