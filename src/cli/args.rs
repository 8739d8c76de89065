//! CLI argument definitions using clap
//!
//! Commands:
//! - crudgate init --config <path>
//! - crudgate serve --config <path>
//! - crudgate request --config <path> --method <M> --path <P> [--query k=v]... [--body JSON]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::LogLevel;

/// crudgate - a deterministic HTTP-to-SQL resource router
#[derive(Parser, Debug)]
#[command(name = "crudgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log verbosity (overridden by RUST_LOG)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the table of every configured resource
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./crudgate.json")]
        config: PathBuf,
    },

    /// Serve HTTP requests until interrupted
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./crudgate.json")]
        config: PathBuf,
    },

    /// Handle a single request and print the response envelope
    Request {
        /// Path to configuration file
        #[arg(long, default_value = "./crudgate.json")]
        config: PathBuf,

        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request path, e.g. /music/1
        #[arg(long)]
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(long = "query", value_parser = parse_key_val)]
        query: Vec<(String, String)>,

        /// JSON body, or "-" to read it from stdin
        #[arg(long)]
        body: Option<String>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
