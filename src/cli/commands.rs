//! CLI command implementations
//!
//! Every command except `init` follows the same boot sequence: load and
//! validate config, require an initialized data directory, read and verify
//! the snapshot, then wire up the `ApiHandler`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::api::ApiHandler;
use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, FileAuditLog, Logger};
use crate::snapshot::{read_snapshot, snapshot_exists, write_snapshot};
use crate::store::{ActorId, RecordStore, StoreState, SystemClock};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request_line, request_lines, write_error, write_json, write_response};

/// Parse process arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
///
/// Stdout carries only command output (JSON responses), so all log lines
/// are routed to stderr for the lifetime of the process.
pub fn run_command(cmd: Command) -> CliResult<()> {
    Logger::set_stderr_only(true);
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
        Command::Exec { config } => exec(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Stats { config } => stats(&config),
    }
}

/// Create the data directory and write an empty snapshot
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let summary = init_data_dir(&config)?;
    write_response(&mut io::stdout(), summary)
}

/// Initialize `config.data_dir`, refusing to overwrite existing state
pub fn init_data_dir(config: &Config) -> CliResult<serde_json::Value> {
    let data_dir = config.data_path();
    if snapshot_exists(data_dir) {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(data_dir).map_err(|e| {
        CliError::io_error(format!(
            "Failed to create data directory {}: {}",
            data_dir.display(),
            e
        ))
    })?;

    let administrator = ActorId::new(config.administrator.trim());
    let state = StoreState::new(administrator.clone());
    let path = write_snapshot(data_dir, &state)?;

    log_event_with_fields(
        Event::SnapshotWritten,
        &[("path", &path.display().to_string()), ("records", "0")],
    );

    Ok(json!({
        "data_dir": config.data_dir,
        "administrator": administrator,
    }))
}

/// Load config, snapshot and observability, returning a ready handler
pub fn boot(config: &Config) -> CliResult<ApiHandler> {
    Logger::set_min_severity(config.severity()?);
    log_event(Event::BootStart);
    log_event_with_fields(Event::ConfigLoaded, &[("data_dir", &config.data_dir)]);

    let data_dir = config.data_path();
    if !snapshot_exists(data_dir) {
        return Err(CliError::not_initialized());
    }

    let state = read_snapshot(data_dir).map_err(|e| {
        if e.is_fatal() {
            log_event_with_fields(Event::SnapshotCorruption, &[("reason", e.message())]);
        } else {
            log_event_with_fields(Event::SnapshotFailed, &[("reason", e.message())]);
        }
        CliError::from(e)
    })?;

    log_event_with_fields(
        Event::SnapshotLoaded,
        &[
            ("administrator", state.administrator().as_str()),
            ("records", &state.record_count().to_string()),
        ],
    );

    let store = RecordStore::from_state(state, Arc::new(SystemClock));
    let mut handler = ApiHandler::new(store);

    if config.snapshot_on_write {
        handler = handler.with_snapshots(data_dir);
    }

    if config.audit_enabled {
        let audit_path = config.audit_path();
        let audit = FileAuditLog::open(&audit_path).map_err(|e| {
            CliError::boot_failed(format!(
                "Failed to open audit log {}: {}",
                audit_path.display(),
                e
            ))
        })?;
        handler = handler.with_audit_log(Arc::new(audit));
    }

    log_event(Event::BootComplete);
    Ok(handler)
}

/// Serve line-delimited JSON requests from stdin until EOF
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let handler = boot(&config)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    serve_lines(&handler, stdin.lock(), &mut stdout)?;

    log_event(Event::ShutdownComplete);
    Ok(())
}

/// Answer each request line from `input` with one response line on `output`
///
/// Malformed requests get an error response and the loop continues; an I/O
/// error on `input` is reported once and ends the loop.
pub fn serve_lines<R: BufRead, W: Write>(
    handler: &ApiHandler,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    for line in request_lines(input) {
        match line {
            Ok(line) => {
                let response = handler.handle(&line);
                write_json(output, &response.to_json())?;
            }
            Err(e) => {
                write_error(output, e.code_str(), e.message())?;
                break;
            }
        }
    }
    Ok(())
}

/// Execute exactly one request from stdin
pub fn exec(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let handler = boot(&config)?;

    let line = read_request_line()?;
    let response = handler.handle(&line);
    write_json(&mut io::stdout(), &response.to_json())
}

/// Run the HTTP adapter until the process is stopped
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let handler = boot(&config)?;

    let mut http_config = config.http.clone();
    if let Some(port) = port {
        http_config.port = port;
    }
    let server = HttpServer::with_config(Arc::new(handler), http_config);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    log_event(Event::ShutdownComplete);
    Ok(())
}

/// Print store statistics
pub fn stats(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let handler = boot(&config)?;
    let stats = serde_json::to_value(handler.stats())?;
    write_response(&mut io::stdout(), stats)
}
