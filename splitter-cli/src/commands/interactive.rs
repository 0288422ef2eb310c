//! Implementation of the 'interactive' subcommand.
//!
//! A small form loop: pick a source, accept or change the suggested output
//! directory and segment duration, split, acknowledge the result, repeat.
//! Failed requests are reported and the loop carries on. While ffmpeg
//! cannot be provisioned no request is launched.

use super::run_request;
use crate::app::{AppState, Notification};
use crate::terminal::{Prompt, Ui};

use splitter_core::{CoreError, ProcessSpawner, Splitter};

use anyhow::Result;
use log::{info, warn};

use std::io::BufRead;
use std::path::PathBuf;

/// Runs the form loop until the user enters an empty source or input ends.
/// Returns the number of requests that were attempted.
pub fn run_interactive<S, R>(mut splitter: Splitter<S>, prompt: &mut Prompt<R>) -> Result<usize>
where
    S: ProcessSpawner + Clone + Send + 'static,
    R: BufRead,
{
    let mut ui = Ui::new(false);
    ui.heading("Splitter: lossless video splitting");
    println!("Leave the video file empty to quit.\n");

    match splitter.provision() {
        Ok(binary) if binary.copied_from().is_some() => ui.log_line("ffmpeg loaded successfully"),
        Ok(_) => ui.log_line("ffmpeg already loaded"),
        Err(e) => ui.notification(&unavailable(&e)),
    }

    let mut state = AppState::new();
    let mut attempted = 0;
    loop {
        let Some(source) = prompt.ask("Video file", None)? else {
            break;
        };
        if source.is_empty() {
            break;
        }
        state.select_source(PathBuf::from(source));

        let suggested = state.output_dir.display().to_string();
        let Some(output_dir) = prompt.ask("Output directory", Some(&suggested))? else {
            break;
        };
        state.select_output_dir(PathBuf::from(output_dir));

        let current = state.segment_minutes.clone();
        let Some(minutes) = prompt.ask("Segment duration in minutes", Some(&current))? else {
            break;
        };
        state.set_segment_minutes(minutes);

        println!();
        if let Err(notification) = ensure_ready(&mut splitter) {
            ui.notification(&notification);
            if !prompt.acknowledge()? {
                break;
            }
            println!();
            continue;
        }
        let (returned, _, notification) = run_request(&mut state, splitter, &mut ui)?;
        splitter = returned;
        attempted += 1;
        info!(
            "Request {attempted} finished ({})",
            if notification.is_success() { "success" } else { "failure" }
        );

        if !prompt.acknowledge()? {
            break;
        }
        println!();
    }

    Ok(attempted)
}

/// Re-provisions a splitter whose binary is missing.
fn ensure_ready<S: ProcessSpawner>(splitter: &mut Splitter<S>) -> Result<(), Notification> {
    if splitter.is_ready() {
        return Ok(());
    }
    splitter.provision().map(|_| ()).map_err(|e| {
        warn!("Request blocked, ffmpeg unavailable: {e}");
        unavailable(&e)
    })
}

fn unavailable(error: &CoreError) -> Notification {
    Notification::Error(format!("ffmpeg is not available, splitting is disabled: {error}"))
}
