// ============================================================================
// splitter-core/src/split.rs
// ============================================================================
//
// SPLIT ORCHESTRATION: One split request from validation to cleanup
//
// This module runs a single request against an already provisioned binary:
//
//   Validating -> Running -> Succeeded | Failed -> CleanedUp
//
// Progress and log lines are reported through an event sink in the order the
// child process produced them. The cache directory is cleaned on every exit
// path, including unwinding, via CacheGuard.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, io_failure};
use crate::external::ffmpeg::{SplitCommand, matches_pattern};
use crate::external::process::{ProcessSpawner, SplitProcess};
use crate::log_filter::{LogLine, filter_line};
use crate::provision::{CacheGuard, ProvisionedBinary, clean_cache};

// ---- External crate imports ----
use log::{debug, info, warn};
use serde::Serialize;

// ---- Standard library imports ----
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// REQUEST / RESULT TYPES
// ============================================================================

/// A user-initiated split, as entered in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRequest {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// Segment length in minutes, as typed. Kept as text so it reaches
    /// ffmpeg exactly as entered.
    pub segment_minutes: String,
}

impl SplitRequest {
    pub fn new(source: PathBuf, output_dir: PathBuf, segment_minutes: impl Into<String>) -> Self {
        Self {
            source,
            output_dir,
            segment_minutes: segment_minutes.into(),
        }
    }

    /// Checks the request before anything touches the filesystem.
    ///
    /// # Errors
    ///
    /// * `CoreError::MissingInput` - empty source or output, or source is not a file
    /// * `CoreError::InvalidSegmentDuration` - minutes not a positive integer
    pub fn validate(&self) -> CoreResult<()> {
        if self.source.as_os_str().is_empty() {
            return Err(CoreError::MissingInput(
                "Please select a video file!".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(CoreError::MissingInput(
                "Please select an output directory!".to_string(),
            ));
        }
        if !self.source.is_file() {
            return Err(CoreError::MissingInput(format!(
                "Source video not found: {}",
                self.source.display()
            )));
        }
        let minutes = self.segment_minutes.trim();
        match minutes.parse::<u64>() {
            Ok(m) if m > 0 => Ok(()),
            _ => Err(CoreError::InvalidSegmentDuration(minutes.to_string())),
        }
    }
}

/// One produced segment file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl Artifact {
    /// File name for display; falls back to the full path.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Outcome of a successful split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    /// Exit code of ffmpeg (always 0 for a returned result).
    pub exit_code: i32,
    /// Visible log lines in the order ffmpeg produced them.
    pub lines: Vec<String>,
    /// Segment files found after the run, sorted by name.
    pub artifacts: Vec<Artifact>,
}

impl ProcessResult {
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.size_bytes).sum()
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// Lifecycle of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitState {
    Idle,
    Validating,
    CheckingBinary,
    Running,
    Succeeded,
    Failed,
    CleanedUp,
}

impl fmt::Display for SplitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitState::Idle => "idle",
            SplitState::Validating => "validating",
            SplitState::CheckingBinary => "checking binary",
            SplitState::Running => "running",
            SplitState::Succeeded => "succeeded",
            SplitState::Failed => "failed",
            SplitState::CleanedUp => "cleaned up",
        };
        f.write_str(name)
    }
}

/// Something the front end should show while a request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitEvent {
    /// The request moved to a new state.
    State(SplitState),
    /// A plain message from the orchestrator itself (headers, summaries).
    Message(String),
    /// A filtered line of ffmpeg output.
    Output(LogLine),
    /// Cleanup finished; number of removed cache entries.
    CleanedUp(usize),
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Runs `request` with the provisioned `binary`.
///
/// Events are delivered to `sink` in order. The cache directory is cleaned
/// before this returns, whatever the outcome, and the last event is always
/// `SplitState::CleanedUp`.
///
/// # Errors
///
/// * `CoreError::MissingInput` / `CoreError::InvalidSegmentDuration` - request rejected, nothing launched
/// * `CoreError::IoFailure` - output directory could not be created or listed
/// * `CoreError::CommandStart` - ffmpeg could not be launched
/// * `CoreError::SplitFailed` - ffmpeg exited with a nonzero status
pub fn split<S, F>(
    spawner: &S,
    binary: &ProvisionedBinary,
    request: &SplitRequest,
    mut sink: F,
) -> CoreResult<ProcessResult>
where
    S: ProcessSpawner,
    F: FnMut(SplitEvent),
{
    sink(SplitEvent::State(SplitState::Validating));
    if let Err(e) = request.validate() {
        return reject(binary.cache_dir(), binary.file_name(), e, &mut sink);
    }
    execute(spawner, binary, request, &mut sink)
}

/// Ends a request that failed before ffmpeg was launched: reports `Failed`,
/// tidies `cache_dir` (keeping `keep`) and reports `CleanedUp`.
pub(crate) fn reject<F>(
    cache_dir: &Path,
    keep: &OsStr,
    error: CoreError,
    sink: &mut F,
) -> CoreResult<ProcessResult>
where
    F: FnMut(SplitEvent),
{
    debug!("Request rejected before launch: {error}");
    sink(SplitEvent::State(SplitState::Failed));
    report_cleanup(clean_cache(cache_dir, keep), sink);
    Err(error)
}

fn report_cleanup<F: FnMut(SplitEvent)>(outcome: CoreResult<usize>, sink: &mut F) {
    match outcome {
        Ok(removed) => {
            debug!("Cache cleanup removed {removed} entries");
            sink(SplitEvent::CleanedUp(removed));
        }
        Err(e) => {
            warn!("Cache cleanup error: {e}");
            sink(SplitEvent::Message(format!("Cleanup error: {e}")));
        }
    }
    sink(SplitEvent::State(SplitState::CleanedUp));
}

/// Runs an already validated request. Cleanup of the cache directory is
/// scoped to this call.
pub(crate) fn execute<S, F>(
    spawner: &S,
    binary: &ProvisionedBinary,
    request: &SplitRequest,
    sink: &mut F,
) -> CoreResult<ProcessResult>
where
    S: ProcessSpawner,
    F: FnMut(SplitEvent),
{
    let guard = CacheGuard::new(binary);

    let result = run_validated(spawner, binary, request, sink);
    sink(SplitEvent::State(if result.is_ok() {
        SplitState::Succeeded
    } else {
        SplitState::Failed
    }));

    report_cleanup(guard.finish(), sink);

    result
}

fn run_validated<S, F>(
    spawner: &S,
    binary: &ProvisionedBinary,
    request: &SplitRequest,
    sink: &mut F,
) -> CoreResult<ProcessResult>
where
    S: ProcessSpawner,
    F: FnMut(SplitEvent),
{
    fs::create_dir_all(&request.output_dir)
        .map_err(io_failure("Failed to create output directory", &request.output_dir))?;

    let command = SplitCommand::new(binary.executable(), request);
    report_header(request, command.pattern(), sink);
    debug!("FFmpeg command: {command}");

    sink(SplitEvent::State(SplitState::Running));
    let mut process = spawner.spawn(command.program(), command.args())?;

    let mut lines = Vec::new();
    let drained = process.handle_lines(|raw| {
        if let Some(line) = filter_line(&raw) {
            lines.push(line.to_string());
            sink(SplitEvent::Output(line));
        }
        Ok(())
    });
    if let Err(e) = drained {
        // Reap the child before giving up on it.
        if let Err(wait_error) = process.wait() {
            warn!("Failed to wait for ffmpeg after read error: {wait_error}");
        }
        return Err(e);
    }

    let exit_code = process.wait()?;
    if exit_code != Some(0) {
        warn!("ffmpeg exited with {exit_code:?} for {}", request.source.display());
        return Err(CoreError::SplitFailed { code: exit_code });
    }

    let artifacts = collect_artifacts(&request.output_dir, command.pattern())?;
    info!(
        "Split {} into {} segment(s)",
        request.source.display(),
        artifacts.len()
    );

    Ok(ProcessResult {
        exit_code: 0,
        lines,
        artifacts,
    })
}

fn report_header<F: FnMut(SplitEvent)>(request: &SplitRequest, pattern: &str, sink: &mut F) {
    let input_name = request
        .source
        .file_name()
        .map_or_else(|| request.source.display().to_string(), |n| n.to_string_lossy().into_owned());
    let messages = [
        "=".repeat(50),
        "Starting video splitting process...".to_string(),
        format!("Input file: {input_name}"),
        format!("Output directory: {}", request.output_dir.display()),
        format!("Segment duration: {} minutes", request.segment_minutes.trim()),
        format!("Output pattern: {pattern}"),
        "-".repeat(50),
    ];
    for message in messages {
        sink(SplitEvent::Message(message));
    }
}

/// Lists the files in `output_dir` produced from `pattern`, sorted by name.
///
/// # Errors
///
/// * `CoreError::IoFailure` - the directory or a file's metadata can't be read
pub fn collect_artifacts(output_dir: &Path, pattern: &str) -> CoreResult<Vec<Artifact>> {
    let entries = fs::read_dir(output_dir)
        .map_err(io_failure("Failed to list output directory", output_dir))?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_failure("Failed to list output directory", output_dir))?;
        let name = entry.file_name();
        if !matches_pattern(pattern, &name.to_string_lossy()) {
            continue;
        }
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(io_failure("Failed to read size of", &path))?;
        if !metadata.is_file() {
            continue;
        }
        artifacts.push(Artifact {
            path,
            size_bytes: metadata.len(),
        });
    }
    artifacts.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockOutcome, MockSpawner};
    use crate::provision::ensure_binary;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        root: TempDir,
        binary: ProvisionedBinary,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempdir().unwrap();
            let bundled = root.path().join("bundled");
            fs::create_dir_all(&bundled).unwrap();
            fs::write(bundled.join("ffmpeg"), b"fake").unwrap();
            let binary = ensure_binary(&root.path().join("cache"), "ffmpeg", &[bundled]).unwrap();
            Self { root, binary }
        }

        fn source(&self, name: &str) -> PathBuf {
            let path = self.root.path().join(name);
            fs::write(&path, b"video").unwrap();
            path
        }

        fn out(&self) -> PathBuf {
            self.root.path().join("out")
        }

        fn cache_entries(&self) -> Vec<String> {
            let mut names: Vec<String> = fs::read_dir(self.binary.cache_dir())
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
    }

    #[test]
    fn test_successful_split_reports_artifacts() {
        let fx = Fixture::new();
        let request = SplitRequest::new(fx.source("sample.mp4"), fx.out(), "20");
        let spawner = MockSpawner::new();
        spawner.push_success(
            &[
                "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'sample.mp4':",
                "frame= 1000 fps=0.0 q=-1.0 size=N/A time=00:45:00.00 bitrate=N/A speed=900x",
                "[segment @ 0x1] Warning: non-monotonous DTS",
                "frame= 2000 fps=0.0 q=-1.0 Lsize=N/A time=01:30:00.00 bitrate=N/A speed=901x",
            ],
            5,
        );
        fs::write(fx.binary.cache_dir().join("scratch.tmp"), b"x").unwrap();

        let mut events = Vec::new();
        let result = split(&spawner, &fx.binary, &request, |e| events.push(e)).unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(
            result.lines,
            vec![
                "Processing... 00:45:00.00",
                "[segment @ 0x1] Warning: non-monotonous DTS",
                "Processing... 01:30:00.00",
            ]
        );
        let names: Vec<String> = result.artifacts.iter().map(Artifact::file_name).collect();
        assert_eq!(
            names,
            vec![
                "sample_splitted_000.mp4",
                "sample_splitted_001.mp4",
                "sample_splitted_002.mp4",
                "sample_splitted_003.mp4",
                "sample_splitted_004.mp4",
            ]
        );
        assert_eq!(result.artifacts[0].size_bytes, 1024);
        assert_eq!(result.total_bytes(), 1024 * 15);

        let calls = spawner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, fx.binary.executable());
        assert!(calls[0].args.contains(&"00:20:00".to_string()));

        assert_eq!(fx.cache_entries(), vec!["ffmpeg"]);

        let states: Vec<SplitState> = events
            .iter()
            .filter_map(|e| match e {
                SplitEvent::State(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                SplitState::Validating,
                SplitState::Running,
                SplitState::Succeeded,
                SplitState::CleanedUp,
            ]
        );
        assert!(events.contains(&SplitEvent::CleanedUp(1)));
    }

    #[test]
    fn test_output_events_keep_emission_order() {
        let fx = Fixture::new();
        let request = SplitRequest::new(fx.source("a.mkv"), fx.out(), "1");
        let spawner = MockSpawner::new();
        spawner.push_success(&["error one", "noise", "warning two", "error three"], 1);

        let mut outputs = Vec::new();
        split(&spawner, &fx.binary, &request, |e| {
            if let SplitEvent::Output(line) = e {
                outputs.push(line.to_string());
            }
        })
        .unwrap();

        assert_eq!(outputs, vec!["error one", "warning two", "error three"]);
    }

    #[test]
    fn test_nonzero_exit_is_split_failed() {
        let fx = Fixture::new();
        let request = SplitRequest::new(fx.source("broken.mp4"), fx.out(), "20");
        let spawner = MockSpawner::new();
        spawner.push_failure(&["broken.mp4: Invalid data found when processing input"], 1);
        fs::create_dir_all(fx.binary.cache_dir().join("leftover")).unwrap();

        let err = split(&spawner, &fx.binary, &request, |_| {}).unwrap_err();

        assert!(matches!(err, CoreError::SplitFailed { code: Some(1) }));
        assert_eq!(fx.cache_entries(), vec!["ffmpeg"]);
    }

    #[test]
    fn test_missing_source_launches_nothing_and_cleans_cache() {
        let fx = Fixture::new();
        let request = SplitRequest::new(fx.root.path().join("nope.mp4"), fx.out(), "20");
        let spawner = MockSpawner::new();
        fs::write(fx.binary.cache_dir().join("scratch.tmp"), b"x").unwrap();

        let mut events = Vec::new();
        let err = split(&spawner, &fx.binary, &request, |e| events.push(e)).unwrap_err();

        assert!(matches!(err, CoreError::MissingInput(_)));
        assert!(spawner.calls().is_empty());
        assert!(!fx.out().exists());
        assert_eq!(fx.cache_entries(), vec!["ffmpeg"]);
        assert_eq!(
            events,
            vec![
                SplitEvent::State(SplitState::Validating),
                SplitEvent::State(SplitState::Failed),
                SplitEvent::CleanedUp(1),
                SplitEvent::State(SplitState::CleanedUp),
            ]
        );
    }

    #[test]
    fn test_invalid_minutes_still_cleans_cache() {
        let fx = Fixture::new();
        let request = SplitRequest::new(fx.source("x.mp4"), fx.out(), "abc");
        fs::create_dir_all(fx.binary.cache_dir().join("partial")).unwrap();

        let err = split(&MockSpawner::new(), &fx.binary, &request, |_| {}).unwrap_err();

        assert!(matches!(err, CoreError::InvalidSegmentDuration(_)));
        assert_eq!(fx.cache_entries(), vec!["ffmpeg"]);
    }

    #[test]
    fn test_read_failure_reaps_child() {
        let fx = Fixture::new();
        let request = SplitRequest::new(fx.source("s.mp4"), fx.out(), "20");
        let spawner = MockSpawner::new();
        spawner.push_outcome(MockOutcome::BrokenOutput {
            lines: vec!["Warning: first".to_string()],
            message: "connection reset".to_string(),
        });

        let mut outputs = Vec::new();
        let err = split(&spawner, &fx.binary, &request, |e| {
            if let SplitEvent::Output(line) = e {
                outputs.push(line.to_string());
            }
        })
        .unwrap_err();

        assert!(matches!(err, CoreError::Unexpected(_)));
        assert_eq!(outputs, vec!["Warning: first"]);
        assert_eq!(spawner.waits(), 1);
        assert_eq!(fx.cache_entries(), vec!["ffmpeg"]);
    }

    #[test]
    fn test_empty_fields_are_missing_input() {
        let request = SplitRequest::new(PathBuf::new(), PathBuf::from("out"), "20");
        assert!(matches!(request.validate(), Err(CoreError::MissingInput(_))));

        let fx = Fixture::new();
        let request = SplitRequest::new(fx.source("x.mp4"), PathBuf::new(), "20");
        assert!(matches!(request.validate(), Err(CoreError::MissingInput(_))));
    }

    #[test]
    fn test_invalid_minutes_rejected() {
        let fx = Fixture::new();
        let source = fx.source("x.mp4");
        for minutes in ["0", "-5", "1.5", "abc", ""] {
            let request = SplitRequest::new(source.clone(), fx.out(), minutes);
            assert!(
                matches!(request.validate(), Err(CoreError::InvalidSegmentDuration(_))),
                "minutes {minutes:?} should be rejected"
            );
        }
        let request = SplitRequest::new(source, fx.out(), " 05 ");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_spawn_error_still_cleans_cache() {
        let fx = Fixture::new();
        let request = SplitRequest::new(fx.source("s.mp4"), fx.out(), "20");
        let spawner = MockSpawner::new();
        spawner.push_outcome(MockOutcome::SpawnError("exec format error".to_string()));
        fs::write(fx.binary.cache_dir().join("junk"), b"x").unwrap();

        let err = split(&spawner, &fx.binary, &request, |_| {}).unwrap_err();

        assert!(matches!(err, CoreError::CommandStart { .. }));
        assert_eq!(fx.cache_entries(), vec!["ffmpeg"]);
    }

    #[test]
    fn test_output_directory_creation_failure() {
        let fx = Fixture::new();
        let blocker = fx.root.path().join("blocker");
        fs::write(&blocker, b"a file, not a directory").unwrap();
        let request = SplitRequest::new(fx.source("s.mp4"), blocker.join("out"), "20");
        let spawner = MockSpawner::new();

        let err = split(&spawner, &fx.binary, &request, |_| {}).unwrap_err();

        assert!(matches!(err, CoreError::IoFailure { .. }));
        assert!(spawner.calls().is_empty());
    }

    #[test]
    fn test_collect_artifacts_ignores_unrelated_files() {
        let dir = tempdir().unwrap();
        for name in [
            "clip_splitted_001.mp4",
            "clip_splitted_000.mp4",
            "clip.mp4",
            "clip_splitted_000.mkv",
            "other_splitted_000.mp4",
        ] {
            fs::write(dir.path().join(name), b"data").unwrap();
        }
        fs::create_dir(dir.path().join("clip_splitted_dir.mp4")).unwrap();

        let artifacts = collect_artifacts(dir.path(), "clip_splitted_%03d.mp4").unwrap();
        let names: Vec<String> = artifacts.iter().map(Artifact::file_name).collect();

        assert_eq!(names, vec!["clip_splitted_000.mp4", "clip_splitted_001.mp4"]);
        assert!(artifacts.iter().all(|a| a.size_bytes == 4));
    }
}
