//! The set of declared resources, before and after expansion.
//!
//! Declaring and expanding are separate types: a [`DeclaredCatalog`] only
//! accepts user resources, and [`DeclaredCatalog::expand`] consumes it to
//! produce the immutable [`Catalog`] the run works from. Cleanups are
//! therefore generated exactly once, from the complete user declaration.

use std::collections::HashSet;

use super::generator::generate_cleanup;
use super::requirement::is_required;
use crate::error::TemporaryFileError;
use crate::resource::{DeclaredResource, PackageManager, ResourceRef, TEMPORARY_FILE_CLEANUP};

/// User-declared resources, in declaration order.
#[derive(Debug, Default)]
pub struct DeclaredCatalog {
    resources: Vec<DeclaredResource>,
    seen: HashSet<ResourceRef>,
}

impl DeclaredCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource.
    ///
    /// Cleanups cannot be declared, a resource cannot require itself, and
    /// every reference must be unique.
    pub fn declare(&mut self, resource: DeclaredResource) -> Result<(), TemporaryFileError> {
        if resource.kind() == TEMPORARY_FILE_CLEANUP {
            return Err(TemporaryFileError::UndeclarableKind(
                TEMPORARY_FILE_CLEANUP.to_string(),
            ));
        }

        let reference = resource.reference().clone();
        if resource.depends_on_ref(&reference) {
            return Err(TemporaryFileError::SelfRequire(reference.to_string()));
        }
        if !self.seen.insert(reference.clone()) {
            return Err(TemporaryFileError::DuplicateResource(reference.to_string()));
        }

        log::debug!("Declared {reference}");
        self.resources.push(resource);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Append one generated cleanup per download.
    ///
    /// Dependents are looked up among the user resources only.
    pub fn expand(self) -> Catalog {
        let cleanups: Vec<_> = self
            .resources
            .iter()
            .filter_map(|resource| match resource {
                DeclaredResource::Download(download) => {
                    Some(generate_cleanup(download, &self.resources))
                }
                _ => None,
            })
            .collect();

        let mut resources = self.resources;
        resources.extend(cleanups.into_iter().map(DeclaredResource::Cleanup));
        Catalog { resources }
    }
}

/// Expanded, read-only catalog for one run.
#[derive(Debug)]
pub struct Catalog {
    resources: Vec<DeclaredResource>,
}

impl Catalog {
    pub fn resources(&self) -> &[DeclaredResource] {
        &self.resources
    }

    pub fn get(&self, reference: &ResourceRef) -> Option<&DeclaredResource> {
        self.resources.iter().find(|r| r.reference() == reference)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// See [`is_required`].
    pub fn is_required(&self, candidate: &ResourceRef, packages: &dyn PackageManager) -> bool {
        is_required(candidate, &self.resources, packages)
    }
}
