//! Provisioning of the external ffmpeg binary.
//!
//! The binary is copied once from an install/search location into a writable
//! cache directory and reused from there on every later run. The cache
//! directory is scratch space: after each split everything except the binary
//! is removed again (see [`clean_cache`] and [`CacheGuard`]).

use crate::error::{CoreError, CoreResult, io_failure};

use log::{debug, info, warn};

use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// A runnable copy of the binary inside the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedBinary {
    cache_dir: PathBuf,
    executable: PathBuf,
    copied_from: Option<PathBuf>,
}

impl ProvisionedBinary {
    /// Directory the binary is cached in.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Full path of the cached executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Source the binary was copied from, if this provisioning call copied it.
    /// `None` means the cache was already populated.
    #[must_use]
    pub fn copied_from(&self) -> Option<&Path> {
        self.copied_from.as_deref()
    }

    /// Whether the cached executable is (still) present on disk.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.executable.is_file()
    }

    /// File name kept by [`clean_cache`].
    pub(crate) fn file_name(&self) -> &std::ffi::OsStr {
        self.executable
            .file_name()
            .unwrap_or(self.executable.as_os_str())
    }
}

/// Ensures a runnable copy of `binary_name` exists in `cache_dir`.
///
/// An existing cached copy is returned untouched. Otherwise `search_dirs` are
/// tried in order and the first match is copied into the cache, keeping its
/// permissions and modification time.
///
/// # Errors
///
/// * `CoreError::IoFailure` - the cache directory cannot be created or the copy fails
/// * `CoreError::BinaryNotFound` - no search directory contains the binary
pub fn ensure_binary(
    cache_dir: &Path,
    binary_name: &str,
    search_dirs: &[PathBuf],
) -> CoreResult<ProvisionedBinary> {
    fs::create_dir_all(cache_dir).map_err(io_failure("Failed to create cache directory", cache_dir))?;

    let executable = cache_dir.join(binary_name);
    if executable.is_file() {
        debug!("{binary_name} already cached at {}", executable.display());
        return Ok(ProvisionedBinary {
            cache_dir: cache_dir.to_path_buf(),
            executable,
            copied_from: None,
        });
    }

    let source = search_dirs
        .iter()
        .map(|dir| dir.join(binary_name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            warn!("{binary_name} not found in {} search location(s)", search_dirs.len());
            CoreError::BinaryNotFound {
                name: binary_name.to_string(),
                searched: search_dirs.to_vec(),
            }
        })?;

    copy_preserving_metadata(&source, &executable)?;
    info!(
        "Provisioned {binary_name}: {} -> {}",
        source.display(),
        executable.display()
    );

    Ok(ProvisionedBinary {
        cache_dir: cache_dir.to_path_buf(),
        executable,
        copied_from: Some(source),
    })
}

/// Copies `from` to `to`; permissions come along with `fs::copy`, the
/// modification time is restored afterwards.
fn copy_preserving_metadata(from: &Path, to: &Path) -> CoreResult<()> {
    fs::copy(from, to).map_err(io_failure("Failed to copy binary from", from))?;

    let modified = fs::metadata(from)
        .and_then(|m| m.modified())
        .map_err(io_failure("Failed to read metadata of", from))?;
    File::options()
        .write(true)
        .open(to)
        .and_then(|f| f.set_modified(modified))
        .map_err(io_failure("Failed to set modification time of", to))?;
    Ok(())
}

/// Removes every entry in `cache_dir` except the file named `keep`.
///
/// A missing cache directory counts as clean. Returns the number of removed
/// entries.
pub fn clean_cache(cache_dir: &Path, keep: &std::ffi::OsStr) -> CoreResult<usize> {
    let entries = match fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(io_failure("Failed to read cache directory", cache_dir)(e)),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(io_failure("Failed to read cache directory", cache_dir))?;
        if entry.file_name() == keep {
            continue;
        }
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(io_failure("Failed to inspect", &path))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(io_failure("Failed to remove", &path))?;
        } else {
            fs::remove_file(&path).map_err(io_failure("Failed to remove", &path))?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Scope guard that cleans the cache directory when dropped.
///
/// [`CacheGuard::finish`] cleans explicitly and reports the result; if the
/// guard is dropped instead (early return, unwinding) the cleanup still runs
/// and failures are only logged.
pub struct CacheGuard<'a> {
    binary: &'a ProvisionedBinary,
    armed: bool,
}

impl<'a> CacheGuard<'a> {
    #[must_use]
    pub fn new(binary: &'a ProvisionedBinary) -> Self {
        Self { binary, armed: true }
    }

    /// Cleans the cache now and disarms the guard.
    pub fn finish(mut self) -> CoreResult<usize> {
        self.armed = false;
        clean_cache(self.binary.cache_dir(), self.binary.file_name())
    }
}

impl Drop for CacheGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = clean_cache(self.binary.cache_dir(), self.binary.file_name()) {
            warn!("Cache cleanup error: {e}");
        }
    }
}
