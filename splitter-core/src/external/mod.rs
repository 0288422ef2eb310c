// ============================================================================
// splitter-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg binary
//
// This module encapsulates everything that talks to the external binary:
// building its command line, spawning it with merged output and probing its
// version. The spawner traits allow tests to substitute a recording mock.

// ---- Standard library imports ----
use std::path::Path;

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains ffmpeg argument building and output naming
pub mod ffmpeg;

/// Contains traits and implementations for spawning child processes
pub mod process;

/// Recording mock spawner for tests
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{SplitCommand, matches_pattern, output_pattern, segment_time};
pub use process::{OutputLines, ProcessSpawner, SplitProcess, StdProcess, StdSpawner};

// ============================================================================
// VERSION PROBING
// ============================================================================

/// Reports the version string of the ffmpeg binary at `path`, e.g. `7.1`.
///
/// Returns `None` (and logs why) when the binary can't be run or its output
/// can't be parsed; callers only use this for display.
#[must_use]
pub fn binary_version(path: &Path) -> Option<String> {
    match ffmpeg_sidecar::version::ffmpeg_version_with_path(path) {
        Ok(version) => Some(version),
        Err(e) => {
            log::debug!("Could not determine version of {}: {e}", path.display());
            None
        }
    }
}
