// splitter-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::process::{ProcessSpawner, SplitProcess};
use crate::error::{CoreError, CoreResult};

use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock implementation of SplitProcess replaying canned output.
#[derive(Debug, Clone)]
pub struct MockProcess {
    /// Lines to emit when handle_lines is called.
    pub lines: Vec<String>,
    /// Exit code to return when wait is called.
    pub exit_code: Option<i32>,
    /// Read failure reported after `lines` have been emitted.
    pub read_error: Option<String>,
    /// Shared count of `wait` calls.
    pub waits: Arc<AtomicUsize>,
}

impl SplitProcess for MockProcess {
    fn handle_lines<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(String) -> CoreResult<()>,
    {
        for line in self.lines.drain(..) {
            handler(line)?;
        }
        match self.read_error.take() {
            Some(message) => Err(CoreError::Unexpected(format!(
                "Failed to read ffmpeg output: {message}"
            ))),
            None => Ok(()),
        }
    }

    fn wait(&mut self) -> CoreResult<Option<i32>> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        Ok(self.exit_code)
    }
}

/// One recorded spawn call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Outcome the mock produces for the next spawn call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// The process starts, emits `lines`, exits with `exit_code` and leaves
    /// `segments` files named after the output pattern (`000`, `001`, ...).
    Run {
        lines: Vec<String>,
        exit_code: Option<i32>,
        segments: usize,
    },
    /// The process starts, emits `lines`, then reading its output fails.
    BrokenOutput { lines: Vec<String>, message: String },
    /// The process cannot be started.
    SpawnError(String),
}

/// Mock implementation of ProcessSpawner. Outcomes are consumed in order;
/// every call is recorded. Thread-safe so it can be moved into a split task.
#[derive(Debug, Clone, Default)]
pub struct MockSpawner {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    waits: Arc<AtomicUsize>,
}

impl MockSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_outcome(&self, outcome: MockOutcome) {
        lock(&self.outcomes).push_back(outcome);
    }

    /// Queues a successful run producing `segments` output files.
    pub fn push_success(&self, lines: &[&str], segments: usize) {
        self.push_outcome(MockOutcome::Run {
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
            exit_code: Some(0),
            segments,
        });
    }

    /// Queues a run that exits with `exit_code` and writes nothing.
    pub fn push_failure(&self, lines: &[&str], exit_code: i32) {
        self.push_outcome(MockOutcome::Run {
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
            exit_code: Some(exit_code),
            segments: 0,
        });
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Number of times a spawned process was waited on.
    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

impl ProcessSpawner for MockSpawner {
    type Process = MockProcess;

    fn spawn(&self, program: &Path, args: &[OsString]) -> CoreResult<Self::Process> {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        lock(&self.calls).push(MockCall {
            program: program.to_path_buf(),
            args: args.clone(),
        });

        let outcome = lock(&self.outcomes).pop_front().unwrap_or_else(|| {
            log::error!("MockSpawner: No outcome queued for command args: {args:?}");
            panic!("MockSpawner: No outcome queued for command args: {args:?}");
        });

        match outcome {
            MockOutcome::Run {
                lines,
                exit_code,
                segments,
            } => {
                if segments > 0 {
                    write_segments(args.last().map(String::as_str), segments);
                }
                Ok(MockProcess {
                    lines,
                    exit_code,
                    read_error: None,
                    waits: Arc::clone(&self.waits),
                })
            }
            MockOutcome::BrokenOutput { lines, message } => Ok(MockProcess {
                lines,
                exit_code: None,
                read_error: Some(message),
                waits: Arc::clone(&self.waits),
            }),
            MockOutcome::SpawnError(message) => Err(CoreError::CommandStart {
                program: program.display().to_string(),
                source: std::io::Error::other(message),
            }),
        }
    }
}

fn write_segments(output_template: Option<&str>, count: usize) {
    let Some(template) = output_template else {
        log::warn!("MockSpawner couldn't find output path in args to create segment files.");
        return;
    };
    for index in 0..count {
        let path = PathBuf::from(template.replace("%03d", &format!("{index:03}")));
        if let Err(e) = std::fs::write(&path, vec![0u8; 1024 * (index + 1)]) {
            log::error!("MockSpawner failed to create segment {}: {e}", path.display());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
