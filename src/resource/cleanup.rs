//! Generated cleanup for a temporary file
//!
//! Never declared by hand: one is generated per download and runs after
//! the download and all its dependents. It only deletes what this run
//! fetched, so a file placed by someone else is left alone.

use anyhow::Result;
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use super::{ResourceRef, TEMPORARY_FILE_CLEANUP};
use crate::engine::RunContext;
use crate::error::TemporaryFileError;

#[derive(Debug, Clone)]
pub struct TemporaryFileCleanup {
    pub reference: ResourceRef,
    /// Path of the download this cleans up.
    pub path: PathBuf,
    /// Informational only.
    pub source: Option<String>,
    pub depends_on: BTreeSet<ResourceRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The path was downloaded this run. `removed` is false if it was
    /// already gone.
    Cleaned { removed: bool },
    /// Not downloaded this run; nothing touched.
    NoOp,
}

impl CleanupOutcome {
    pub fn to_apply_result(self) -> ApplyResult {
        match self {
            Self::Cleaned { removed: true } => ApplyResult::Removed,
            Self::Cleaned { removed: false } | Self::NoOp => ApplyResult::NoChange,
        }
    }
}

#[derive(Debug)]
pub struct CleanupHandler {
    cleanup: TemporaryFileCleanup,
    run: Arc<RunContext>,
}

impl CleanupHandler {
    pub fn new(cleanup: TemporaryFileCleanup, run: Arc<RunContext>) -> Self {
        Self { cleanup, run }
    }

    pub fn converge(&self) -> Result<CleanupOutcome, TemporaryFileError> {
        let path = &self.cleanup.path;

        if !self.run.tracked.contains(path) {
            log::debug!("{} was not downloaded this run, leaving it", path.display());
            return Ok(CleanupOutcome::NoOp);
        }

        let removed = self.run.fs.remove_file(path).map_err(|e| match e {
            fetchkit::Error::Io { path, source } => TemporaryFileError::Removal { path, source },
            other => TemporaryFileError::Unexpected {
                source_uri: self.cleanup.source.clone().unwrap_or_default(),
                message: other.to_string(),
            },
        })?;

        if removed {
            log::info!("Cleaned up {}", path.display());
        } else {
            log::debug!("{} already gone", path.display());
        }
        Ok(CleanupOutcome::Cleaned { removed })
    }
}

impl Resource for CleanupHandler {
    fn id(&self) -> String {
        self.cleanup.reference.to_string()
    }

    fn description(&self) -> String {
        format!("Clean up {}", self.cleanup.path.display())
    }

    fn resource_type(&self) -> &'static str {
        TEMPORARY_FILE_CLEANUP
    }

    fn depends_on(&self) -> Vec<String> {
        self.cleanup
            .depends_on
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    // Never reported present, so the cleanup is considered every run.
    fn current_state(&self) -> Result<ResourceState> {
        Ok(ResourceState::Absent)
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        let outcome = self.converge().map_err(TemporaryFileError::into_report)?;
        Ok(outcome.to_apply_result())
    }
}
