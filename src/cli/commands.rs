//! CLI command implementations
//!
//! Each command loads the configuration, builds what it needs, and runs to
//! completion. Nothing is shared between commands.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::executor::{bootstrap, Executor};
use crate::http_server::HttpServer;
use crate::observability::init_logging;
use crate::orchestrator::{RequestOrchestrator, ResponseEnvelope};
use crate::router::Verb;

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_body, write_json};

/// Main CLI entry point
///
/// Parses arguments, installs logging, and dispatches to the command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(cli.log_level);
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
        Command::Request {
            config,
            method,
            path,
            query,
            body,
        } => request(&config, &method, &path, query, body.as_deref()),
    }
}

/// Create the table of every configured resource
///
/// Safe to run repeatedly; existing tables are left untouched.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let registry = config.registry()?;

    bootstrap(&config.database_path(), &registry)?;
    info!(
        database = %config.database_path,
        resources = registry.names().len(),
        "store initialized"
    );

    Ok(())
}

/// Serve HTTP requests until Ctrl-C
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let orchestrator = orchestrator(&config)?;
    let server = HttpServer::new(config.http.clone(), orchestrator);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::io_error(format!("HTTP server failed: {}", e)))
    })
}

/// Handle one request without the HTTP transport and print its envelope
///
/// Request-level failures are part of the envelope, not CLI errors.
pub fn request(
    config_path: &Path,
    method: &str,
    path: &str,
    query: Vec<(String, String)>,
    body: Option<&str>,
) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let body = read_body(body)?;
    let query: HashMap<String, String> = query.into_iter().collect();

    let verb = match method.parse::<Verb>() {
        Ok(verb) => verb,
        Err(e) => {
            let envelope = ResponseEnvelope::error(e.kind(), e.to_string());
            return write_json(&envelope.to_json());
        }
    };

    let orchestrator = orchestrator(&config)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    let envelope = rt.block_on(orchestrator.handle(verb, path, &query, body));
    write_json(&envelope.to_json())
}

fn orchestrator(config: &Config) -> CliResult<RequestOrchestrator> {
    let registry = Arc::new(config.registry()?);
    let executor = Executor::open(&config.database_path(), config.executor_config());
    Ok(RequestOrchestrator::new(registry, executor))
}
