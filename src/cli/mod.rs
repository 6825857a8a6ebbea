//! CLI module for walkdb
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty snapshot
//! - serve: Open the store and run the HTTP server
//! - import: Bulk-load walks from a JSON array

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{import, init, run, run_command, serve, Config, StoreKind, SNAPSHOT_FILE};
pub use errors::{CliError, CliErrorCode, CliResult};
