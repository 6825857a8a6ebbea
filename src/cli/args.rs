//! CLI argument definitions using clap
//!
//! Commands:
//! - walkdb init --config <path>
//! - walkdb serve --config <path> [--port <port>]
//! - walkdb import --config <path> --file <walks.json>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// walkdb - a catalog of walks served over HTTP
#[derive(Parser, Debug)]
#[command(name = "walkdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new walkdb data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./walkdb.json")]
        config: PathBuf,
    },

    /// Serve the walk catalog over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./walkdb.json")]
        config: PathBuf,

        /// Override the port from the configuration file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load walks from a JSON array file into the catalog
    Import {
        /// Path to configuration file
        #[arg(long, default_value = "./walkdb.json")]
        config: PathBuf,

        /// JSON file holding an array of walks
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
