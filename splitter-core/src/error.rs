// ============================================================================
// splitter-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the splitter-core library
//
// Every failure a split attempt can hit is expressed as a CoreError variant.
// The orchestrator boundary never panics on these; the caller decides how to
// surface them (log panel marker + notification in the CLI).

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification of a failure, used by front ends to pick wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No source or output selected, or the source does not exist.
    MissingInput,
    /// The segment duration is not a positive whole number of minutes.
    InvalidSegmentDuration,
    /// The ffmpeg binary could not be provisioned.
    BinaryNotFound,
    /// ffmpeg ran and exited with a nonzero status.
    SplitFailed,
    /// A filesystem operation failed.
    IoFailure,
    /// Anything else that went wrong during the run.
    UnexpectedFailure,
}

/// Custom error type for splitter-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    MissingInput(String),

    #[error("Invalid segment duration '{0}': expected a positive whole number of minutes")]
    InvalidSegmentDuration(String),

    #[error("{name} not found. Searched: {}", display_paths(searched))]
    BinaryNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Video splitting failed: ffmpeg exited with {}", display_exit(*code))]
    SplitFailed { code: Option<i32> },

    #[error("{context}: {source}")]
    IoFailure {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start '{program}': {source}")]
    CommandStart {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl CoreError {
    /// Maps the error onto the user-facing failure classes.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::MissingInput(_) => ErrorKind::MissingInput,
            CoreError::InvalidSegmentDuration(_) => ErrorKind::InvalidSegmentDuration,
            CoreError::BinaryNotFound { .. } => ErrorKind::BinaryNotFound,
            CoreError::SplitFailed { .. } => ErrorKind::SplitFailed,
            CoreError::IoFailure { .. } => ErrorKind::IoFailure,
            CoreError::CommandStart { .. } | CoreError::Unexpected(_) => {
                ErrorKind::UnexpectedFailure
            }
        }
    }
}

impl From<io::Error> for CoreError {
    fn from(source: io::Error) -> Self {
        CoreError::IoFailure {
            context: "I/O error".to_string(),
            source,
        }
    }
}

/// Result type for splitter-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Returns a closure wrapping an `io::Error` with a path-specific context.
///
/// Meant for `map_err`: `fs::create_dir_all(dir).map_err(io_failure("Failed to create", dir))?`.
pub fn io_failure<'a>(action: &'a str, path: &'a Path) -> impl FnOnce(io::Error) -> CoreError + 'a {
    move |source| CoreError::IoFailure {
        context: format!("{action} '{}'", path.display()),
        source,
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no search locations configured)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
