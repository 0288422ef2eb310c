// splitter-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{ArgAction, Parser, Subcommand};
use splitter_core::SplitterConfig;
use splitter_core::config::{DEFAULT_OUTPUT_DIR_NAME, DEFAULT_SEGMENT_MINUTES, default_cache_dir};
use std::path::{Path, PathBuf};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Splitter: lossless video splitting",
    long_about = "Splits a video into fixed-duration segments with ffmpeg stream copy \
                  (no re-encoding) via the splitter-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the runnable copy of ffmpeg (defaults to the platform cache dir)
    #[arg(long, global = true, value_name = "CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Additional directory to look for a bundled ffmpeg in; may be repeated,
    /// earlier directories win
    #[arg(long = "ffmpeg-dir", global = true, value_name = "DIR", action = ArgAction::Append)]
    pub ffmpeg_dirs: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Write logs to a timestamped file in this directory instead of the console
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Splits one video file into fixed-duration segments
    Split(SplitArgs),
    /// Prompts for requests in a loop until an empty source is entered
    Interactive,
    /// Copies ffmpeg into the cache directory and reports where it came from
    Provision,
}

#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// Video file to split
    #[arg(required = true, value_name = "SOURCE")]
    pub source: PathBuf,

    /// Directory for the segments (defaults to SOURCE_DIR/output)
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Segment duration in whole minutes
    #[arg(short = 'm', long = "minutes", value_name = "MINUTES", default_value = DEFAULT_SEGMENT_MINUTES)]
    pub minutes: String,

    /// Print the result as JSON instead of the human-readable log
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    /// Builds the core configuration from the global options.
    pub fn splitter_config(&self) -> SplitterConfig {
        let cache_dir = self.cache_dir.clone().unwrap_or_else(default_cache_dir);
        // with_search_dir prepends, so walk backwards to keep the given order.
        self.ffmpeg_dirs
            .iter()
            .rev()
            .fold(SplitterConfig::new(cache_dir), |config, dir| {
                config.with_search_dir(dir.clone())
            })
    }
}

impl SplitArgs {
    /// Output directory as given, or `output` next to the source.
    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&self.source))
    }
}

/// The output directory suggested for a freshly selected source.
pub fn default_output_dir(source: &Path) -> PathBuf {
    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_OUTPUT_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split_basic_args() {
        let cli = Cli::parse_from(["splitter", "split", "/videos/movie.mkv"]);

        match cli.command {
            Commands::Split(args) => {
                assert_eq!(args.source, PathBuf::from("/videos/movie.mkv"));
                assert!(args.output_dir.is_none());
                assert_eq!(args.minutes, "20");
                assert!(!args.json);
                assert_eq!(args.effective_output_dir(), PathBuf::from("/videos/output"));
            }
            other => panic!("Expected Split command, got {other:?}"),
        }
        assert!(!cli.verbose);
        assert!(cli.ffmpeg_dirs.is_empty());
    }

    #[test]
    fn test_parse_split_with_options() {
        let cli = Cli::parse_from([
            "splitter",
            "split",
            "clip.mp4",
            "-o",
            "segments",
            "-m",
            "5",
            "--json",
            "--no-color",
        ]);

        assert!(cli.no_color);
        match cli.command {
            Commands::Split(args) => {
                assert_eq!(args.output_dir, Some(PathBuf::from("segments")));
                assert_eq!(args.effective_output_dir(), PathBuf::from("segments"));
                assert_eq!(args.minutes, "5");
                assert!(args.json);
            }
            other => panic!("Expected Split command, got {other:?}"),
        }
    }

    #[test]
    fn test_relative_source_defaults_output_to_cwd() {
        assert_eq!(default_output_dir(Path::new("clip.mp4")), PathBuf::from("output"));
    }

    #[test]
    fn test_global_options_before_and_after_subcommand() {
        let cli = Cli::parse_from([
            "splitter",
            "--cache-dir",
            "/tmp/cache",
            "--ffmpeg-dir",
            "/opt/a",
            "provision",
            "--ffmpeg-dir",
            "/opt/b",
            "-v",
        ]);

        assert!(matches!(cli.command, Commands::Provision));
        assert!(cli.verbose);
        assert_eq!(
            cli.ffmpeg_dirs,
            vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
        );

        let config = cli.splitter_config();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.search_dirs[0], PathBuf::from("/opt/a"));
        assert_eq!(config.search_dirs[1], PathBuf::from("/opt/b"));
    }

    #[test]
    fn test_split_requires_source() {
        assert!(Cli::try_parse_from(["splitter", "split"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
