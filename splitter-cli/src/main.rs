// splitter-cli/src/main.rs
//
// Entry point of the `splitter` binary: parses arguments, installs the
// logger, dispatches to the command and maps the outcome to an exit code.

use clap::Parser;
use log::debug;
use splitter_cli::terminal::{self, Prompt};
use splitter_cli::{Cli, Commands, logging, run_interactive, run_provision, run_split};
use splitter_core::Splitter;

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    terminal::configure_colors(cli.no_color);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            terminal::print_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Some(log_file) = logging::init_logging(cli.verbose, cli.log_dir.as_deref())? {
        eprintln!("Logging to {}", log_file.display());
    }

    let config = cli.splitter_config();
    debug!(
        "Cache directory: {}, search directories: {:?}",
        config.cache_dir.display(),
        config.search_dirs
    );
    let splitter = Splitter::new(config);

    match cli.command {
        Commands::Split(args) => run_split(splitter, &args),
        Commands::Interactive => {
            let mut prompt = Prompt::new(io::stdin().lock());
            run_interactive(splitter, &mut prompt)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Provision => {
            run_provision(splitter)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
