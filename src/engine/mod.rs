//! Execution engine for tempfetch
//!
//! The engine orchestrates:
//! 1. Declaring - manifest entries become a [`DeclaredCatalog`]
//! 2. Expanding - every download gets its generated cleanup ([`Catalog`])
//! 3. Planning - each catalog entry becomes a handler in a
//!    [`declarative::ExecutionPlan`] sharing one [`RunContext`]
//!
//! Execution itself is [`declarative::execute`].

pub mod catalog;
pub mod differ;
pub mod generator;
pub mod planner;
pub mod requirement;

use fetchkit::{FileSystem, Fetcher};
use std::fmt;

use crate::registry::TrackedPaths;
use crate::resource::PackageManager;

pub use catalog::{Catalog, DeclaredCatalog};
pub use generator::generate_cleanup;
pub use planner::build_plan;
pub use requirement::is_required;

/// Everything one run shares: the registry of downloaded paths and the
/// services resources talk to.
///
/// Built fresh for every run, so nothing leaks from one run into the next.
pub struct RunContext {
    pub tracked: TrackedPaths,
    pub fetcher: Box<dyn Fetcher>,
    pub fs: Box<dyn FileSystem>,
    pub packages: Box<dyn PackageManager>,
}

impl RunContext {
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        fs: Box<dyn FileSystem>,
        packages: Box<dyn PackageManager>,
    ) -> Self {
        Self {
            tracked: TrackedPaths::new(),
            fetcher,
            fs,
            packages,
        }
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("tracked", &self.tracked)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Builders shared by the engine and resource tests.

    use super::*;
    use crate::resource::package::MemoryPackages;
    use fetchkit::{LocalFs, MockFetcher};
    use std::sync::Arc;

    pub fn run_context(fetcher: &MockFetcher, packages: &MemoryPackages) -> Arc<RunContext> {
        Arc::new(RunContext::new(
            Box::new(fetcher.clone()),
            Box::new(LocalFs),
            Box::new(packages.clone()),
        ))
    }
}
