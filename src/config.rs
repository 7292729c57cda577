//! Server configuration
//!
//! Command line flags with environment fallbacks. `main` loads `.env` with
//! `dotenvy` before parsing, so either source works.

use clap::Parser;

use crate::{APP_NAME, DB_CONNECTIONS_COUNT_DEFAULT, HTTP_BIND_ADDRESS_DEFAULT};

/// SOAP endpoint for managing Pokemon trainers
#[derive(Parser, Debug, Clone)]
#[command(name = APP_NAME)]
#[command(about = "SOAP endpoint for managing Pokemon trainers")]
#[command(version)]
pub struct ServerConfig {
    /// HTTP bind address
    #[arg(short, long, env = "TRAINER_BIND", default_value = HTTP_BIND_ADDRESS_DEFAULT)]
    pub bind: String,

    /// Postgres connection URL. Without one, trainers are kept in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Size of the Postgres connection pool
    #[arg(long, env = "TRAINER_DB_MAX_CONNECTIONS", default_value_t = DB_CONNECTIONS_COUNT_DEFAULT)]
    pub db_max_connections: u32,

    /// Preload the demo trainers (memory store only)
    #[arg(long)]
    pub seed: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ServerConfig {
    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
