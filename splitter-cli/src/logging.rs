// ============================================================================
// splitter-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or file logger for the CLI
//
// The terminal UI prints split progress itself, so the console logger only
// shows warnings unless `--verbose` is given. With `--log-dir` every record
// goes to a timestamped session file instead (see splitter_core::file_logging).
//
// RUST_LOG overrides the console level, e.g. RUST_LOG=splitter_core=trace.

use anyhow::{Context, Result};
use console::style;
use log::LevelFilter;
use splitter_core::file_logging::{session_log_path, setup_file_logging};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Level used when the user didn't ask for verbose output.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Installs the global logger. Returns the session log file when logging to
/// a directory.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let level = level_for(verbose);

    if let Some(dir) = log_dir {
        let log_file = session_log_path(dir);
        // File logs are for later inspection; keep info records there.
        setup_file_logging(&log_file, level.max(LevelFilter::Info))
            .with_context(|| format!("Failed to set up logging in {}", dir.display()))?;
        log::debug!("Logging to {}", log_file.display());
        return Ok(Some(log_file));
    }

    env_logger::Builder::new()
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            }
            .for_stderr();
            writeln!(buf, "{} {level} {}", buf.timestamp(), record.args())
        })
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .context("Failed to initialize console logger")?;

    Ok(None)
}
