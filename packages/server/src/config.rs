//! Command line and environment configuration of the server binary.

use std::path::PathBuf;

use clap::Parser;

/// Default capacity of each session's outbox.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "parley-server")]
#[command(about = "Real-time chat server for support tickets", long_about = None)]
pub struct Config {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "PARLEY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PARLEY_PORT", default_value = "8080")]
    pub port: u16,

    /// Events buffered per session before deliveries to it are skipped
    #[arg(long, env = "PARLEY_OUTBOX_CAPACITY", default_value_t = DEFAULT_OUTBOX_CAPACITY)]
    pub outbox_capacity: usize,

    /// JSON accounts file seeding the token table
    #[arg(long, env = "PARLEY_ACCOUNTS")]
    pub accounts: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "PARLEY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}
