// ============================================================================
// splitter-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Log panel, busy spinner and notifications
//
// Log lines are printed above a spinner that only exists while a request is
// running. Styling is picked from the line content so the core never has to
// know about colors.

use crate::app::{Activity, Notification};

use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};

use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const WARNING_SYMBOL: &str = "⚠";
    pub const SPINNER_TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
    pub const SPINNER_INTERVAL_MS: u64 = 120;
}

/// Turns colors off when asked to or when `NO_COLOR` is set.
pub fn configure_colors(no_color: bool) {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

/// Renders the application to the terminal.
///
/// A quiet UI swallows everything; `--json` uses it so stdout carries only
/// the report.
pub struct Ui {
    quiet: bool,
    spinner: Option<ProgressBar>,
}

impl Ui {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinner: None,
        }
    }

    /// Shows or hides the busy spinner.
    pub fn set_activity(&mut self, activity: Activity) {
        match activity {
            Activity::Busy if self.spinner.is_none() && !self.quiet => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("  {spinner} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner())
                        .tick_chars(styling::SPINNER_TICKS),
                );
                pb.set_message("Splitting...");
                pb.enable_steady_tick(Duration::from_millis(styling::SPINNER_INTERVAL_MS));
                self.spinner = Some(pb);
            }
            Activity::Idle => {
                if let Some(pb) = self.spinner.take() {
                    pb.finish_and_clear();
                }
            }
            Activity::Busy => {}
        }
    }

    /// Prints one log panel line above the spinner.
    pub fn log_line(&self, line: &str) {
        if self.quiet {
            return;
        }
        let styled = style_line(line);
        match &self.spinner {
            Some(pb) => pb.suspend(|| println!("{styled}")),
            None => println!("{styled}"),
        }
    }

    /// Shows the final outcome of a request as a framed block.
    pub fn notification(&self, notification: &Notification) {
        if self.quiet {
            return;
        }
        println!();
        match notification {
            Notification::Success(message) => println!(
                "  {} {}",
                style(styling::SUCCESS_SYMBOL).green().bold(),
                style(message).green().bold()
            ),
            Notification::Error(message) => {
                println!(
                    "  {} {}",
                    style(styling::ERROR_SYMBOL).red().bold(),
                    style("Error").red().bold()
                );
                println!("  {:<10} {message}", "Message:");
            }
        }
        println!();
    }

    /// Prints a `label: value` pair with a bold label.
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if !self.quiet {
            println!("  {:<14} {value}", style(format!("{label}:")).bold());
        }
    }

    /// Prints a highlighted heading.
    pub fn heading(&self, text: &str) {
        if !self.quiet {
            println!("{}", style(text).bold().cyan());
        }
    }
}

impl Drop for Ui {
    fn drop(&mut self) {
        self.set_activity(Activity::Idle);
    }
}

/// Applies colors based on the line's role.
fn style_line(line: &str) -> String {
    let lower = line.to_lowercase();
    let trimmed = line.trim_start();
    if trimmed.starts_with(styling::SUCCESS_SYMBOL) {
        style(line).green().to_string()
    } else if trimmed.starts_with(styling::ERROR_SYMBOL) {
        style(line).red().bold().to_string()
    } else if line.starts_with("===") || line.starts_with("---") {
        style(line).cyan().dim().to_string()
    } else if line.starts_with("Processing...") {
        style(line).blue().to_string()
    } else if lower.contains("error") {
        style(line).red().to_string()
    } else if lower.contains("warning") {
        style(line).yellow().to_string()
    } else {
        line.to_string()
    }
}

/// Prints an error that ended the command before any request ran.
pub fn print_fatal(error: &anyhow::Error) {
    let _ = Term::stderr().write_line(&format!(
        "{} {}",
        style(format!("{} Error:", styling::ERROR_SYMBOL)).red().bold().for_stderr(),
        format!("{error:#}")
    ));
}

// ============================================================================
// PROMPTS
// ============================================================================

/// Line-based prompts read from any buffered input.
pub struct Prompt<R> {
    input: R,
}

impl<R: BufRead> Prompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Asks for a value. `None` means the input is exhausted.
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> io::Result<Option<String>> {
        match default {
            Some(default) if !default.is_empty() => {
                print!("{} [{}]: ", style(question).bold(), style(default).dim());
            }
            _ => print!("{}: ", style(question).bold()),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            println!();
            return Ok(None);
        }
        let answer = unquote(line.trim());
        if answer.is_empty() {
            return Ok(Some(default.unwrap_or_default().to_string()));
        }
        Ok(Some(answer.to_string()))
    }

    /// Blocks until the user acknowledges with Enter. Returns `false` at end of input.
    pub fn acknowledge(&mut self) -> io::Result<bool> {
        print!("{}", style("Press Enter to continue...").dim());
        io::stdout().flush()?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            println!();
        }
        Ok(read > 0)
    }
}

/// Strips one pair of surrounding quotes, as left behind by drag and drop.
fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
