//! CLI module for crudgate
//!
//! Provides command-line interface for:
//! - init: Create the table of every configured resource
//! - serve: Run the HTTP transport
//! - request: Handle one request and print the envelope

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, request, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_body, write_json};
