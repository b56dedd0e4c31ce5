//! CLI argument definitions using clap
//!
//! Commands:
//! - keyledger init --config <path>
//! - keyledger start --config <path>
//! - keyledger exec --config <path>
//! - keyledger serve --config <path> [--port <port>]
//! - keyledger stats --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// keyledger - a versioned key-value record store
#[derive(Parser, Debug)]
#[command(name = "keyledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./keyledger.json")]
        config: PathBuf,
    },

    /// Serve JSON requests from stdin, one per line
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./keyledger.json")]
        config: PathBuf,
    },

    /// Execute a single request from stdin and exit
    Exec {
        /// Path to configuration file
        #[arg(long, default_value = "./keyledger.json")]
        config: PathBuf,
    },

    /// Run the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./keyledger.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print store statistics
    Stats {
        /// Path to configuration file
        #[arg(long, default_value = "./keyledger.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
