//! Filesystem service used by resources that write or delete files.

use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Filesystem operations needed to place and remove downloaded files.
pub trait FileSystem: Send + Sync {
    /// Create `path` and all missing parents. Succeeds if it already exists.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create or truncate `path` and copy `reader` into it.
    ///
    /// Returns the number of bytes written.
    fn write_from(&self, path: &Path, reader: &mut dyn Read) -> Result<u64>;

    /// Set the permission bits of `path` (ignored where unsupported).
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;

    /// Delete the file at `path`.
    ///
    /// Returns `false` when there was nothing to delete.
    fn remove_file(&self, path: &Path) -> Result<bool>;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// Remembers whether an error came from the reading side of a copy.
struct ReadTracker<'a> {
    inner: &'a mut dyn Read,
    failed: bool,
}

impl Read for ReadTracker<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|_| self.failed = true)
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))
    }

    fn write_from(&self, path: &Path, reader: &mut dyn Read) -> Result<u64> {
        let mut file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
        let mut source = ReadTracker {
            inner: reader,
            failed: false,
        };
        let written = io::copy(&mut source, &mut file).map_err(|e| {
            if source.failed {
                Error::Read(e)
            } else {
                Error::io(path, e)
            }
        })?;
        file.sync_all().map_err(|e| Error::io(path, e))?;
        log::debug!("Wrote {written} bytes to {}", path.display());
        Ok(written)
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        log::debug!("Ignoring mode {mode:o} for {} on this platform", path.display());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
