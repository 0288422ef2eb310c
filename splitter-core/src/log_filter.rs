//! Filtering of ffmpeg output for the visible log.
//!
//! ffmpeg's merged output is mostly noise for someone waiting on a split. Only
//! status lines (compressed to their timestamp) and lines mentioning an error
//! or warning are kept; everything else is dropped.

use std::fmt;

/// A line worth showing to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// A `frame=... time=...` status line, reduced to its timestamp.
    Progress(String),
    /// A diagnostic line passed through verbatim.
    Diagnostic(String),
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLine::Progress(timestamp) => write!(f, "Processing... {timestamp}"),
            LogLine::Diagnostic(line) => f.write_str(line),
        }
    }
}

const KEYWORDS: [&str; 4] = ["error", "warning", "time=", "frame="];

/// Classifies one raw output line.
///
/// The line is trimmed first. Lines carrying both `time=` and `frame=` become
/// [`LogLine::Progress`]; other lines containing any of `error`, `warning`,
/// `time=` or `frame=` (case-insensitive) are kept verbatim; the rest yields
/// `None`.
#[must_use]
pub fn filter_line(raw: &str) -> Option<LogLine> {
    let line = raw.trim();
    let lower = line.to_lowercase();
    if !KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        return None;
    }

    if line.contains("time=") && line.contains("frame=") {
        if let Some(timestamp) = progress_timestamp(line) {
            return Some(LogLine::Progress(timestamp.to_string()));
        }
    }
    Some(LogLine::Diagnostic(line.to_string()))
}

/// First whitespace-delimited token after the first `time=`.
fn progress_timestamp(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once("time=")?;
    let rest = rest.split("time=").next().unwrap_or(rest);
    rest.split_whitespace().next()
}
