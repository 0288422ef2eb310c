// ============================================================================
// splitter-cli/src/app.rs
// ============================================================================
//
// APPLICATION STATE: Form fields, busy indicator and log panel
//
// AppState holds everything the terminal UI shows for the current request.
// Handlers update it from user input and from core events; the terminal
// module only renders what the state hands back.

use crate::cli::default_output_dir;

use splitter_core::config::DEFAULT_SEGMENT_MINUTES;
use splitter_core::{
    CoreError, CoreResult, ProcessResult, SplitEvent, SplitRequest, SplitState, format_megabytes,
};

use log::debug;

use std::path::PathBuf;

/// Message shown after the cache directory has been tidied.
pub const CLEANUP_MESSAGE: &str = "Temporary files cleaned up (ffmpeg preserved)";

/// Two-state progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Busy,
}

/// Outcome shown to the user once a request has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success(_))
    }
}

/// What the interface currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub segment_minutes: String,
    pub activity: Activity,
    /// Lines of the log panel for the current request.
    pub log: Vec<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            output_dir: PathBuf::new(),
            segment_minutes: DEFAULT_SEGMENT_MINUTES.to_string(),
            activity: Activity::Idle,
            log: Vec::new(),
        }
    }
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source and suggests `output` next to it as output directory.
    pub fn select_source(&mut self, source: PathBuf) {
        self.output_dir = default_output_dir(&source);
        self.source = source;
    }

    pub fn select_output_dir(&mut self, output_dir: PathBuf) {
        self.output_dir = output_dir;
    }

    pub fn set_segment_minutes(&mut self, minutes: impl Into<String>) {
        self.segment_minutes = minutes.into();
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.activity == Activity::Busy
    }

    /// Request built from the current form fields.
    #[must_use]
    pub fn request(&self) -> SplitRequest {
        SplitRequest::new(
            self.source.clone(),
            self.output_dir.clone(),
            self.segment_minutes.clone(),
        )
    }

    /// Starts a new request: clears the log panel and marks the UI busy.
    pub fn begin(&mut self) {
        self.log.clear();
        self.activity = Activity::Busy;
    }

    /// Applies one core event. Returns the line to show in the log panel, if any.
    pub fn handle_event(&mut self, event: SplitEvent) -> Option<String> {
        let line = match event {
            SplitEvent::State(state) => {
                debug!("Split state: {state}");
                if state == SplitState::CleanedUp {
                    self.activity = Activity::Idle;
                }
                return None;
            }
            SplitEvent::Message(message) => message,
            SplitEvent::Output(line) => line.to_string(),
            SplitEvent::CleanedUp(_) => CLEANUP_MESSAGE.to_string(),
        };
        self.log.push(line.clone());
        Some(line)
    }

    /// Records the final result. Returns the summary lines appended to the
    /// log panel together with the notification to show.
    pub fn finish(&mut self, result: &CoreResult<ProcessResult>) -> (Vec<String>, Notification) {
        self.activity = Activity::Idle;

        let (lines, notification) = match result {
            Ok(result) => summarize(result),
            Err(e) => failure(e),
        };
        self.log.extend(lines.iter().cloned());
        (lines, notification)
    }
}

fn summarize(result: &ProcessResult) -> (Vec<String>, Notification) {
    let mut lines = vec!["-".repeat(50), "✓ Video successfully split!".to_string()];
    lines.push("Created files:".to_string());
    for artifact in &result.artifacts {
        lines.push(format!(
            "  ✓ {} ({})",
            artifact.file_name(),
            format_megabytes(artifact.size_bytes)
        ));
    }
    lines.push(format!("Total {} files created.", result.artifacts.len()));
    lines.push("=".repeat(50));

    (
        lines,
        Notification::Success("Video successfully split!".to_string()),
    )
}

fn failure(error: &CoreError) -> (Vec<String>, Notification) {
    (
        vec![format!("✗ Error: {error}")],
        Notification::Error(error.to_string()),
    )
}
