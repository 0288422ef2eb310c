//! File logging for split sessions.
//!
//! Each session gets its own timestamped file. Records from the splitter
//! crates are kept at the requested level; everything else (ffmpeg-sidecar,
//! log4rs itself) only reaches the file from `warn` upwards, so a verbose
//! session log stays about splitting.

use anyhow::Result;
use log::{LevelFilter, info};
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::{Path, PathBuf};

/// Log targets written at the session level.
pub const SESSION_TARGETS: [&str; 3] = ["splitter_core", "splitter_cli", "splitter"];

/// Level applied to every other target.
pub const OTHER_TARGETS_LEVEL: LevelFilter = LevelFilter::Warn;

const SESSION_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} [{T}] {t} - {m}{n}";

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
#[must_use]
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of a new session log file inside `log_dir`.
#[must_use]
pub fn session_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("splitter_{}.log", get_timestamp()))
}

/// Builds the log4rs configuration for one session file.
///
/// The file is truncated, so a reused path never mixes two sessions.
pub fn session_config(log_file: &Path, level: LevelFilter) -> Result<Config> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = FileAppender::builder()
        .append(false)
        .encoder(Box::new(PatternEncoder::new(SESSION_PATTERN)))
        .build(log_file)?;

    let mut builder =
        Config::builder().appender(Appender::builder().build("session", Box::new(file_appender)));
    for target in SESSION_TARGETS {
        builder = builder.logger(
            Logger::builder()
                .appender("session")
                .additive(false)
                .build(target, level),
        );
    }

    Ok(builder.build(
        Root::builder()
            .appender("session")
            .build(OTHER_TARGETS_LEVEL.min(level)),
    )?)
}

/// Installs the session file as the global logger and writes a header line.
pub fn setup_file_logging(log_file: &Path, level: LevelFilter) -> Result<()> {
    log4rs::init_config(session_config(log_file, level)?)?;
    info!(
        "Splitter {} session started (level {level})",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}
