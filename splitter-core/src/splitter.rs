//! Application service tying provisioning and orchestration together.
//!
//! A [`Splitter`] owns the configuration, the process spawner and the
//! provisioned binary. Front ends either call [`Splitter::run`] directly or
//! hand the splitter to [`spawn_split`], which runs the request on a worker
//! thread and streams events back over a channel. Because the splitter moves
//! into the worker, a second request cannot start until it is handed back by
//! [`SplitTask::join`].

use crate::config::SplitterConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::process::{ProcessSpawner, StdSpawner};
use crate::provision::{ProvisionedBinary, ensure_binary};
use crate::split::{self, ProcessResult, SplitEvent, SplitRequest, SplitState};

use log::{info, warn};

use std::ffi::OsStr;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Provisioned splitter ready to run requests.
#[derive(Debug)]
pub struct Splitter<S = StdSpawner> {
    config: SplitterConfig,
    spawner: S,
    binary: Option<ProvisionedBinary>,
}

impl Splitter<StdSpawner> {
    /// Creates a splitter that launches the real binary.
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self::with_spawner(config, StdSpawner)
    }
}

impl<S: ProcessSpawner> Splitter<S> {
    /// Creates a splitter with a custom spawner (tests, alternative runtimes).
    pub fn with_spawner(config: SplitterConfig, spawner: S) -> Self {
        Self {
            config,
            spawner,
            binary: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// The provisioned binary, if provisioning has succeeded.
    #[must_use]
    pub fn binary(&self) -> Option<&ProvisionedBinary> {
        self.binary.as_ref()
    }

    /// Whether a provisioned binary is present on disk.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.binary.as_ref().is_some_and(ProvisionedBinary::is_ready)
    }

    /// Provisions the binary into the cache directory.
    ///
    /// # Errors
    ///
    /// * `CoreError::BinaryNotFound` - no search directory contains the binary
    /// * `CoreError::IoFailure` - the cache directory or the copy failed
    pub fn provision(&mut self) -> CoreResult<&ProvisionedBinary> {
        let binary = ensure_binary(
            &self.config.cache_dir,
            &self.config.binary_name,
            &self.config.search_dirs,
        )?;
        Ok(self.binary.insert(binary))
    }

    /// Runs one request. A missing binary triggers a single re-provisioning
    /// attempt before the request fails with `BinaryNotFound`.
    ///
    /// # Errors
    ///
    /// Everything [`split::split`] can return, plus provisioning errors.
    pub fn run<F>(&mut self, request: &SplitRequest, mut sink: F) -> CoreResult<ProcessResult>
    where
        F: FnMut(SplitEvent),
    {
        sink(SplitEvent::State(SplitState::Validating));
        if let Err(e) = request.validate() {
            return self.reject(e, &mut sink);
        }

        sink(SplitEvent::State(SplitState::CheckingBinary));
        if !self.is_ready() {
            warn!("{} not ready, attempting to reload", self.config.binary_name);
            sink(SplitEvent::Message(format!(
                "{} not found, attempting to reload...",
                self.config.binary_name
            )));
            if let Err(e) = self.provision() {
                return self.reject(e, &mut sink);
            }
        }

        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| CoreError::Unexpected("binary missing after provisioning".to_string()))?;
        split::execute(&self.spawner, binary, request, &mut sink)
    }

    /// Ends a request that never launched. The cache is tidied even when no
    /// binary has been provisioned yet.
    fn reject<F>(&self, error: CoreError, sink: &mut F) -> CoreResult<ProcessResult>
    where
        F: FnMut(SplitEvent),
    {
        split::reject(
            &self.config.cache_dir,
            OsStr::new(&self.config.binary_name),
            error,
            sink,
        )
    }
}

// ============================================================================
// BACKGROUND EXECUTION
// ============================================================================

/// Message delivered from a running [`SplitTask`].
#[derive(Debug)]
pub enum SplitMessage {
    Event(SplitEvent),
    Finished(CoreResult<ProcessResult>),
}

/// A request running on a worker thread.
pub struct SplitTask<S> {
    messages: Receiver<SplitMessage>,
    handle: JoinHandle<Splitter<S>>,
}

impl<S> SplitTask<S> {
    /// Channel of events, closed by a final `SplitMessage::Finished`.
    #[must_use]
    pub fn messages(&self) -> &Receiver<SplitMessage> {
        &self.messages
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker and returns the splitter for the next request.
    ///
    /// # Errors
    ///
    /// * `CoreError::Unexpected` - the worker panicked; the splitter is lost
    pub fn join(self) -> CoreResult<Splitter<S>> {
        self.handle.join().map_err(|panic| {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            CoreError::Unexpected(format!("split worker panicked: {reason}"))
        })
    }
}

/// Moves `splitter` into a worker thread and runs `request` there.
///
/// Events arrive on [`SplitTask::messages`] in the order they were produced,
/// followed by exactly one `SplitMessage::Finished` unless the worker panics.
pub fn spawn_split<S>(mut splitter: Splitter<S>, request: SplitRequest) -> SplitTask<S>
where
    S: ProcessSpawner + Send + 'static,
{
    let (sender, messages) = mpsc::channel();
    let handle = thread::spawn(move || {
        info!("Split task started for {}", request.source.display());
        let result = splitter.run(&request, |event| {
            // A dropped receiver only means nobody is watching any more.
            let _ = sender.send(SplitMessage::Event(event));
        });
        let _ = sender.send(SplitMessage::Finished(result));
        splitter
    });
    SplitTask { messages, handle }
}
