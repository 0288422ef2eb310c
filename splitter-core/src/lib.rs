//! Core library for splitting videos into fixed-duration segments with ffmpeg.
//!
//! The heavy lifting (demuxing, cutting at keyframes, timestamp reset) is done
//! by ffmpeg's `segment` muxer in stream-copy mode. This crate provisions the
//! binary into a cache directory, builds the command line, streams and filters
//! the child's output, and reports the produced segment files.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use splitter_core::{SplitRequest, Splitter, SplitterConfig};
//! use std::path::PathBuf;
//!
//! let mut splitter = Splitter::new(SplitterConfig::default());
//! splitter.provision().unwrap();
//!
//! let request = SplitRequest::new(
//!     PathBuf::from("/videos/movie.mp4"),
//!     PathBuf::from("/videos/output"),
//!     "20",
//! );
//! let result = splitter.run(&request, |event| println!("{event:?}")).unwrap();
//! for artifact in &result.artifacts {
//!     println!("{} ({} bytes)", artifact.path.display(), artifact.size_bytes);
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod log_filter;
pub mod provision;
pub mod split;
pub mod splitter;
pub mod utils;

// Re-exports for public API
pub use config::{DEFAULT_SEGMENT_MINUTES, SplitterConfig};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use external::{ProcessSpawner, SplitCommand, SplitProcess, StdSpawner, binary_version};
pub use log_filter::{LogLine, filter_line};
pub use provision::{ProvisionedBinary, clean_cache, ensure_binary};
pub use split::{
    Artifact, ProcessResult, SplitEvent, SplitRequest, SplitState, collect_artifacts, split,
};
pub use splitter::{SplitMessage, SplitTask, Splitter, spawn_split};
pub use utils::{format_bytes, format_megabytes};
