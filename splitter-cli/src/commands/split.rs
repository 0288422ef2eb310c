//! Implementation of the 'split' subcommand.
//!
//! Splits a single source and exits with status 1 when the split fails.

use super::run_request;
use crate::app::AppState;
use crate::cli::SplitArgs;
use crate::terminal::Ui;

use splitter_core::{CoreResult, ProcessResult, ProcessSpawner, Splitter};

use anyhow::Result;
use log::warn;
use serde_json::json;

use std::process::ExitCode;

/// Runs one split request built from `args`.
pub fn run_split<S>(mut splitter: Splitter<S>, args: &SplitArgs) -> Result<ExitCode>
where
    S: ProcessSpawner + Clone + Send + 'static,
{
    if let Err(e) = splitter.provision() {
        // The run re-provisions and reports the failure through the usual path.
        warn!("Provisioning before split failed: {e}");
    }

    let mut state = AppState::new();
    state.select_source(args.source.clone());
    state.select_output_dir(args.effective_output_dir());
    state.set_segment_minutes(args.minutes.clone());

    let mut ui = Ui::new(args.json);
    let (_, result, _) = run_request(&mut state, splitter, &mut ui)?;

    if args.json {
        println!("{}", json_report(&result)?);
    }

    Ok(match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

fn json_report(result: &CoreResult<ProcessResult>) -> Result<String> {
    let value = match result {
        Ok(result) => json!({
            "success": true,
            "exit_code": result.exit_code,
            "lines": result.lines,
            "artifacts": result.artifacts,
            "total_bytes": result.total_bytes(),
        }),
        Err(e) => json!({
            "success": false,
            "error": e.to_string(),
            "kind": format!("{:?}", e.kind()),
        }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
