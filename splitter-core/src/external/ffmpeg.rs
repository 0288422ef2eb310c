//! FFmpeg command building for lossless segment splitting.
//!
//! This module turns a [`SplitRequest`] into the exact ffmpeg argument list
//! (stream copy of every stream, `segment` muxer, per-segment timestamp reset)
//! and owns the output file naming scheme shared with artifact discovery.

use crate::split::SplitRequest;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Infix inserted between the source base name and the sequence number.
pub const SPLIT_INFIX: &str = "_splitted_";

/// printf-style sequence placeholder understood by ffmpeg's segment muxer.
pub const SEQUENCE_PLACEHOLDER: &str = "%03d";

/// Splits a file name into base name and extension.
///
/// Only the last dot starts an extension, leading dots never do, and a
/// trailing dot is kept as the extension:
/// `clip.mp4` → (`clip`, `.mp4`), `.hidden` → (`.hidden`, ``),
/// `name.` → (`name`, `.`).
#[must_use]
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let Some(dot) = file_name.rfind('.') else {
        return (file_name, "");
    };
    if file_name[..dot].chars().all(|c| c == '.') {
        return (file_name, "");
    }
    file_name.split_at(dot)
}

/// Derives the segment file name pattern, e.g. `movie.mp4` →
/// `movie_splitted_%03d.mp4`.
#[must_use]
pub fn output_pattern(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (base, ext) = split_extension(&file_name);
    format!("{base}{SPLIT_INFIX}{SEQUENCE_PLACEHOLDER}{ext}")
}

/// Formats the `-segment_time` value from the user's minute count. The text is
/// used verbatim: `20` → `00:20:00`, `5` → `00:5:00`, `120` → `00:120:00`.
#[must_use]
pub fn segment_time(minutes: &str) -> String {
    format!("00:{minutes}:00")
}

/// Whether `file_name` is a segment produced from `pattern`. The sequence
/// placeholder matches any run of characters; everything else is literal.
#[must_use]
pub fn matches_pattern(pattern: &str, file_name: &str) -> bool {
    match pattern.split_once(SEQUENCE_PLACEHOLDER) {
        Some((prefix, suffix)) => {
            file_name.len() >= prefix.len() + suffix.len()
                && file_name.starts_with(prefix)
                && file_name.ends_with(suffix)
        }
        None => file_name == pattern,
    }
}

/// A fully built ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCommand {
    program: PathBuf,
    args: Vec<OsString>,
    pattern: String,
}

impl SplitCommand {
    /// Builds the split command for `request` using the binary at `program`:
    ///
    /// `<program> -i <source> -c copy -map 0 -segment_time 00:<m>:00 -f segment
    /// -reset_timestamps 1 -loglevel warning <output_dir>/<base>_splitted_%03d<ext>`
    #[must_use]
    pub fn new(program: &Path, request: &SplitRequest) -> Self {
        let pattern = output_pattern(&request.source);
        let output = request.output_dir.join(&pattern);

        let mut args: Vec<OsString> = Vec::with_capacity(16);
        args.push("-i".into());
        args.push(request.source.clone().into_os_string());
        args.extend(["-c", "copy"].map(OsString::from));
        args.extend(["-map", "0"].map(OsString::from));
        args.push("-segment_time".into());
        args.push(segment_time(request.segment_minutes.trim()).into());
        args.extend(["-f", "segment"].map(OsString::from));
        args.extend(["-reset_timestamps", "1"].map(OsString::from));
        args.extend(["-loglevel", "warning"].map(OsString::from));
        args.push(output.into_os_string());

        Self {
            program: program.to_path_buf(),
            args,
            pattern,
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Output file name pattern the command writes to.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for SplitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
