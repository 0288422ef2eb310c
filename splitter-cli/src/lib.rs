// splitter-cli/src/lib.rs
//
// Library portion of the Splitter CLI application.
// Contains argument definitions, UI state and command logic.

pub mod app;
pub mod cli;
pub mod commands;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use app::{Activity, AppState, Notification};
pub use cli::{Cli, Commands, SplitArgs};
pub use commands::interactive::run_interactive;
pub use commands::provision::run_provision;
pub use commands::split::run_split;
