// ============================================================================
// splitter-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// This module defines where the ffmpeg binary is looked for, what it is called
// on the current platform and where the runnable copy is cached. Front ends
// build a SplitterConfig from their own options and hand it to Splitter.

// ---- Standard library imports ----
use std::env;
use std::path::PathBuf;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Base name of the external processing binary, without platform suffix.
pub const BINARY_STEM: &str = "ffmpeg";

/// Segment duration offered by front ends before the user types anything.
pub const DEFAULT_SEGMENT_MINUTES: &str = "20";

/// Name of the output directory suggested next to a freshly selected source.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "output";

/// Application directory name used below the platform cache directory.
pub const CACHE_APP_DIR: &str = "video-splitter";

/// Scratch directory name used next to the executable when no platform cache
/// directory is known.
pub const FALLBACK_CACHE_DIR_NAME: &str = "temp";

/// Executable file name of the binary on the current platform
/// (`ffmpeg` on unix, `ffmpeg.exe` on Windows).
#[must_use]
pub fn default_binary_name() -> String {
    format!("{BINARY_STEM}{}", env::consts::EXE_SUFFIX)
}

/// Directory the application was installed into (the running executable's
/// directory).
#[must_use]
pub fn install_dir() -> Option<PathBuf> {
    ffmpeg_sidecar::paths::sidecar_dir().ok()
}

/// Default search order for the bundled binary: install directory first,
/// then the current working directory.
#[must_use]
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = install_dir() {
        dirs.push(dir);
    }
    if let Ok(cwd) = env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}

/// Default writable cache location for the provisioned binary.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        return cache.join(CACHE_APP_DIR);
    }
    install_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(FALLBACK_CACHE_DIR_NAME)
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Provisioning configuration for the splitter.
///
/// # Examples
///
/// ```rust,no_run
/// use splitter_core::SplitterConfig;
/// use std::path::PathBuf;
///
/// let config = SplitterConfig::new(PathBuf::from("/tmp/splitter-cache"))
///     .with_search_dir(PathBuf::from("/opt/ffmpeg/bin"));
/// assert_eq!(config.search_dirs[0], PathBuf::from("/opt/ffmpeg/bin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Directory holding the runnable copy of the binary between runs.
    /// Everything else in it is removed after each split.
    pub cache_dir: PathBuf,

    /// File name of the executable, platform suffix included.
    pub binary_name: String,

    /// Ordered directories searched for the binary when the cache is empty.
    pub search_dirs: Vec<PathBuf>,
}

impl SplitterConfig {
    /// Creates a configuration with platform defaults for the binary name and
    /// search order.
    #[must_use]
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            binary_name: default_binary_name(),
            search_dirs: default_search_dirs(),
        }
    }

    /// Adds a directory to be searched before the defaults. Later calls take
    /// precedence over earlier ones.
    #[must_use]
    pub fn with_search_dir(mut self, dir: PathBuf) -> Self {
        self.search_dirs.retain(|d| d != &dir);
        self.search_dirs.insert(0, dir);
        self
    }

    /// Path the provisioned binary lives at inside the cache directory.
    #[must_use]
    pub fn cached_binary_path(&self) -> PathBuf {
        self.cache_dir.join(&self.binary_name)
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self::new(default_cache_dir())
    }
}
