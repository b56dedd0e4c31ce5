//! CLI module for keyledger
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty snapshot
//! - start: Boot and serve JSON requests line by line on stdin/stdout
//! - exec: One-shot request execution
//! - serve: Run the HTTP adapter
//! - stats: Print store statistics

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    boot, exec, init, init_data_dir, run, run_command, serve, serve_lines, start, stats,
};
pub use config::{Config, AUDIT_LOG_FILE};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request_line, request_lines, write_error, write_json, write_response};
