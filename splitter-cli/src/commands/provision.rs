//! Implementation of the 'provision' subcommand.

use crate::terminal::{Ui, styling};

use splitter_core::{ProcessSpawner, Splitter, binary_version, format_bytes};

use anyhow::{Context, Result};
use console::style;

/// Provisions the binary and reports where it lives.
pub fn run_provision<S: ProcessSpawner>(mut splitter: Splitter<S>) -> Result<()> {
    let binary = splitter
        .provision()
        .context("Could not provision ffmpeg")?;

    let ui = Ui::new(false);
    println!(
        "{} {}",
        style(styling::SUCCESS_SYMBOL).green().bold(),
        style("ffmpeg is ready").bold()
    );
    ui.field("Path", binary.executable().display());
    match binary.copied_from() {
        Some(source) => ui.field("Copied from", source.display()),
        None => ui.field("Copied from", "already cached"),
    }
    if let Ok(metadata) = std::fs::metadata(binary.executable()) {
        ui.field("Size", format_bytes(metadata.len()));
    }
    let version = binary_version(binary.executable()).unwrap_or_else(|| "unknown".to_string());
    ui.field("Version", version);
    Ok(())
}
