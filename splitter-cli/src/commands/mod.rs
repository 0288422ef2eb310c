//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. The
//! helper below drives one request through a background split task and
//! renders its events as they arrive.

pub mod interactive;
pub mod provision;
pub mod split;

use crate::app::{AppState, Notification};
use crate::terminal::Ui;

use splitter_core::{
    CoreError, CoreResult, ProcessResult, ProcessSpawner, SplitMessage, Splitter, spawn_split,
};

use anyhow::Result;
use log::{error, warn};

/// Runs the request held in `state` on a worker thread.
///
/// Returns the splitter for the next request, the core result and the
/// notification that was shown. If the worker dies, the request fails with
/// `CoreError::Unexpected` and a fresh splitter is built from the same
/// configuration.
pub fn run_request<S>(
    state: &mut AppState,
    splitter: Splitter<S>,
    ui: &mut Ui,
) -> Result<(Splitter<S>, CoreResult<ProcessResult>, Notification)>
where
    S: ProcessSpawner + Clone + Send + 'static,
{
    state.begin();
    ui.set_activity(state.activity);

    let config = splitter.config().clone();
    let spawner = splitter.spawner().clone();
    let task = spawn_split(splitter, state.request());
    let mut finished = None;
    for message in task.messages().iter() {
        match message {
            SplitMessage::Event(event) => {
                if let Some(line) = state.handle_event(event) {
                    ui.log_line(&line);
                }
                ui.set_activity(state.activity);
            }
            SplitMessage::Finished(result) => {
                finished = Some(result);
                break;
            }
        }
    }
    let (splitter, result) = match task.join() {
        Ok(splitter) => {
            let result = finished.unwrap_or_else(|| {
                Err(CoreError::Unexpected("split worker ended without a result".to_string()))
            });
            (splitter, result)
        }
        Err(e) => {
            error!("{e}");
            let mut splitter = Splitter::with_spawner(config, spawner);
            if let Err(provision_error) = splitter.provision() {
                warn!("Provisioning after worker failure failed: {provision_error}");
            }
            (splitter, Err(e))
        }
    };

    let (lines, notification) = state.finish(&result);
    ui.set_activity(state.activity);
    for line in &lines {
        ui.log_line(line);
    }
    ui.notification(&notification);

    Ok((splitter, result, notification))
}
