// ============================================================================
// splitter-core/src/external/process.rs
// ============================================================================
//
// PROCESS EXECUTION: Child Process Management and Abstraction
//
// This module provides the seam between the orchestrator and the operating
// system: a spawner creates a process, the process hands out its merged
// stdout/stderr line by line and finally reports its exit code.
//
// KEY COMPONENTS:
// - SplitProcess: Trait representing a running child process
// - ProcessSpawner: Trait for creating new processes
// - StdSpawner: Concrete implementation on std::process with a merged pipe
// - OutputLines: Line splitter tolerant of '\r' and undecodable bytes

use crate::error::{CoreError, CoreResult};

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, PipeReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};

// --- Process Execution Abstraction ---

/// Trait representing an active child process instance.
pub trait SplitProcess {
    /// Feeds every line of the merged output stream to `handler`, in emission
    /// order, until the process closes the stream.
    fn handle_lines<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(String) -> CoreResult<()>;

    /// Waits for the process to exit. `None` means it was terminated by a
    /// signal and has no exit code.
    fn wait(&mut self) -> CoreResult<Option<i32>>;
}

/// Trait representing something that can spawn a [`SplitProcess`].
pub trait ProcessSpawner {
    type Process: SplitProcess;

    fn spawn(&self, program: &Path, args: &[OsString]) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using std::process ---

/// Child process whose stdout and stderr share one pipe.
pub struct StdProcess {
    child: Child,
    output: Option<PipeReader>,
}

impl SplitProcess for StdProcess {
    fn handle_lines<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(String) -> CoreResult<()>,
    {
        let Some(reader) = self.output.take() else {
            return Ok(());
        };
        for line in OutputLines::new(reader) {
            let line = line.map_err(|e| {
                log::error!("Failed to read ffmpeg output: {e}");
                CoreError::Unexpected(format!("Failed to read ffmpeg output: {e}"))
            })?;
            handler(line)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<Option<i32>> {
        // Reader closed before waiting: a child still writing gets EPIPE
        // instead of blocking on a full pipe.
        self.output = None;
        let status = self
            .child
            .wait()
            .map_err(|e| CoreError::Unexpected(format!("Failed to wait for ffmpeg: {e}")))?;
        Ok(status.code())
    }
}

/// Spawns processes with `std::process::Command`, stdin closed and both
/// output streams merged into a single anonymous pipe.
#[derive(Debug, Clone, Default)]
pub struct StdSpawner;

impl ProcessSpawner for StdSpawner {
    type Process = StdProcess;

    fn spawn(&self, program: &Path, args: &[OsString]) -> CoreResult<Self::Process> {
        let start_error = |source: io::Error| CoreError::CommandStart {
            program: program.display().to_string(),
            source,
        };

        let (reader, writer) = io::pipe().map_err(start_error)?;
        let writer_for_stderr = writer.try_clone().map_err(start_error)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_for_stderr);

        let child = command.spawn().map_err(start_error)?;
        // `command` still owns the parent's copies of the write end; they must
        // be gone before reading or EOF never arrives.
        drop(command);

        Ok(StdProcess {
            child,
            output: Some(reader),
        })
    }
}

// --- Line Splitting ---

/// Iterator over the lines of a byte stream.
///
/// `\n`, `\r\n` and a bare `\r` all end a line, so ffmpeg's carriage-return
/// status updates arrive as separate lines. Invalid UTF-8 is replaced rather
/// than reported.
pub struct OutputLines<R> {
    reader: BufReader<R>,
    pending_cr: bool,
    done: bool,
}

impl<R: Read> OutputLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending_cr: false,
            done: false,
        }
    }
}

impl<R: Read> Iterator for OutputLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut line = Vec::new();
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if buf.is_empty() {
                self.done = true;
                if line.is_empty() {
                    return None;
                }
                return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
            }

            let mut start = 0;
            if self.pending_cr {
                self.pending_cr = false;
                if buf[0] == b'\n' {
                    start = 1;
                }
            }

            match buf[start..].iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(pos) => {
                    let end = start + pos;
                    line.extend_from_slice(&buf[start..end]);
                    self.pending_cr = buf[end] == b'\r';
                    self.reader.consume(end + 1);
                    return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
                }
                None => {
                    let len = buf.len();
                    line.extend_from_slice(&buf[start..]);
                    self.reader.consume(len);
                }
            }
        }
    }
}
