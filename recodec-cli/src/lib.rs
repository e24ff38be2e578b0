// recodec-cli/src/lib.rs
//
// Library portion of the Recodec CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod signals;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::Cli;
pub use commands::run::run;
