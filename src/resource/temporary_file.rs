//! Temporary file resource
//!
//! A download that only happens when some other resource needs it. Whether
//! it is needed is decided at apply time, every run; a file already on
//! disk never short-circuits that decision.

use anyhow::Result;
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use fetchkit::FileSystem;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use super::{Ensure, ResourceRef, TEMPORARY_FILE};
use crate::engine::{Catalog, RunContext};
use crate::error::TemporaryFileError;
use crate::paths;

/// Permission bits of a fetched file.
pub const FILE_MODE: u32 = 0o644;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("sanitize pattern is valid"));

/// A declared `temporary_file`.
#[derive(Debug, Clone)]
pub struct TemporaryFile {
    pub reference: ResourceRef,
    /// http(s) URI to fetch from.
    pub source: String,
    /// Absolute destination.
    pub path: PathBuf,
    pub ensure: Ensure,
    pub depends_on: BTreeSet<ResourceRef>,
}

impl TemporaryFile {
    /// Validate a declaration and resolve its destination.
    ///
    /// Without an explicit `path`, the file goes to
    /// `<var_dir>/temp_files/<name>`. An explicit path has `~` and variables
    /// expanded and must be absolute. Either way the parent directory is
    /// created right away.
    pub fn declare(
        name: &str,
        source: &str,
        path: Option<&str>,
        var_dir: &Path,
        fs: &dyn FileSystem,
    ) -> Result<Self, TemporaryFileError> {
        fetchkit::check_http_uri(source)
            .map_err(|_| TemporaryFileError::InvalidSource(source.to_string()))?;

        let path = match path {
            Some(raw) => {
                let expanded = paths::expand(raw);
                if !expanded.is_absolute() {
                    return Err(TemporaryFileError::RelativePath(raw.to_string()));
                }
                expanded
            }
            None => paths::temp_files_dir(var_dir).join(file_name_for(name)),
        };

        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent)
                .map_err(|e| TemporaryFileError::from_fetch(source, e))?;
        }

        Ok(Self::at(name, source, path))
    }

    /// Build a declaration with a known destination, skipping validation.
    pub fn at(name: &str, source: &str, path: PathBuf) -> Self {
        Self {
            reference: ResourceRef::new(TEMPORARY_FILE, name),
            source: source.to_string(),
            path,
            ensure: Ensure::Present,
            depends_on: BTreeSet::new(),
        }
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    pub fn with_depends_on(mut self, refs: impl IntoIterator<Item = ResourceRef>) -> Self {
        self.depends_on.extend(refs);
        self
    }

    pub fn name(&self) -> &str {
        self.reference.name()
    }

    pub fn reference(&self) -> &ResourceRef {
        &self.reference
    }
}

/// File name used under `temp_files/` for a resource name.
pub fn file_name_for(name: &str) -> String {
    let sanitized = UNSAFE_CHARS.replace_all(name, "_").into_owned();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        // "", "." and ".." must not resolve to a directory
        return "_".repeat(sanitized.len().max(1));
    }
    sanitized
}

/// What a download did when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Nothing needed the file.
    Skipped,
    Fetched { bytes: u64 },
    /// `ensure = absent` deleted the file.
    Removed,
    /// `ensure = absent` and there was nothing to delete.
    AlreadyAbsent,
}

impl DownloadOutcome {
    pub fn to_apply_result(self) -> ApplyResult {
        match self {
            Self::Skipped => ApplyResult::Skipped {
                reason: "not required by any resource".to_string(),
            },
            Self::Fetched { .. } => ApplyResult::Created,
            Self::Removed => ApplyResult::Removed,
            Self::AlreadyAbsent => ApplyResult::NoChange,
        }
    }
}

/// A [`TemporaryFile`] bound to one run.
#[derive(Debug)]
pub struct TemporaryFileHandler {
    file: TemporaryFile,
    catalog: Arc<Catalog>,
    run: Arc<RunContext>,
}

impl TemporaryFileHandler {
    pub fn new(file: TemporaryFile, catalog: Arc<Catalog>, run: Arc<RunContext>) -> Self {
        Self { file, catalog, run }
    }

    /// Bring the file to its desired state.
    pub fn converge(&self) -> Result<DownloadOutcome, TemporaryFileError> {
        match self.file.ensure {
            Ensure::Absent => self.remove(),
            Ensure::Present => {
                if self
                    .catalog
                    .is_required(&self.file.reference, self.run.packages.as_ref())
                {
                    self.fetch()
                } else {
                    log::info!("Skipping {}: no resource requires it", self.file.reference);
                    Ok(DownloadOutcome::Skipped)
                }
            }
        }
    }

    // The path is tracked before anything can fail, so the cleanup also
    // removes partial downloads.
    fn fetch(&self) -> Result<DownloadOutcome, TemporaryFileError> {
        let source = &self.file.source;
        let path = &self.file.path;
        let wrap = |e: fetchkit::Error| TemporaryFileError::from_fetch(source, e);

        self.run.tracked.add(path);

        if let Some(parent) = path.parent() {
            self.run.fs.create_dir_all(parent).map_err(wrap)?;
        }

        log::info!("Downloading {source} to {}", path.display());
        let mut body = self.run.fetcher.open(source).map_err(wrap)?;
        let bytes = self.run.fs.write_from(path, &mut body).map_err(wrap)?;
        self.run.fs.set_mode(path, FILE_MODE).map_err(wrap)?;

        log::info!("Fetched {bytes} bytes for {}", self.file.reference);
        Ok(DownloadOutcome::Fetched { bytes })
    }

    fn remove(&self) -> Result<DownloadOutcome, TemporaryFileError> {
        let path = &self.file.path;
        match self.run.fs.remove_file(path) {
            Ok(true) => {
                log::info!("Removed {}", path.display());
                Ok(DownloadOutcome::Removed)
            }
            Ok(false) => Ok(DownloadOutcome::AlreadyAbsent),
            Err(fetchkit::Error::Io { path, source }) => {
                Err(TemporaryFileError::Removal { path, source })
            }
            Err(e) => Err(TemporaryFileError::from_fetch(&self.file.source, e)),
        }
    }
}

impl Resource for TemporaryFileHandler {
    fn id(&self) -> String {
        self.file.reference.to_string()
    }

    fn description(&self) -> String {
        format!(
            "Temporary file {} from {}",
            self.file.path.display(),
            self.file.source
        )
    }

    fn resource_type(&self) -> &'static str {
        TEMPORARY_FILE
    }

    fn depends_on(&self) -> Vec<String> {
        self.file.depends_on.iter().map(ToString::to_string).collect()
    }

    fn current_state(&self) -> Result<ResourceState> {
        match self.file.ensure {
            // Always re-evaluated at apply time.
            Ensure::Present => Ok(ResourceState::Absent),
            Ensure::Absent => {
                if self.run.fs.exists(&self.file.path) {
                    Ok(ResourceState::Present {
                        details: Some(self.file.path.display().to_string()),
                    })
                } else {
                    Ok(ResourceState::Absent)
                }
            }
        }
    }

    fn desired_state(&self) -> ResourceState {
        match self.file.ensure {
            Ensure::Present => ResourceState::Present {
                details: Some(self.file.path.display().to_string()),
            },
            Ensure::Absent => ResourceState::Absent,
        }
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
