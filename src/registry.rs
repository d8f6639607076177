//! Paths downloaded during the current run.
//!
//! A download registers its destination before fetching; the matching
//! cleanup deletes only paths found here. One registry lives for exactly
//! one run and is shared by every resource of that run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of destination paths fetched (or attempted) in this run.
///
/// All access goes through one lock, so concurrent downloads and cleanups
/// never observe a torn update.
#[derive(Debug, Default)]
pub struct TrackedPaths {
    paths: Mutex<BTreeSet<PathBuf>>,
}

impl TrackedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`. Returns `false` if it was already tracked.
    pub fn add(&self, path: &Path) -> bool {
        let inserted = self.lock().insert(path.to_path_buf());
        log::debug!("Tracking {} (new: {inserted})", path.display());
        inserted
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    /// Copy of the current contents, for diagnostics.
    pub fn snapshot(&self) -> BTreeSet<PathBuf> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<PathBuf>> {
        // A panicking holder cannot leave a BTreeSet half-inserted.
        self.paths.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
