//! Command-line interface parsing for rankwatch
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated [`ServerConfig`]. Most flags can also be set through
//! `RANKWATCH_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::cache::{CacheManager, MAX_ENTRIES};
use crate::data::tranco::{DEFAULT_LIST_SIZE, TRANCO_BASE_URL};
use crate::resolver::DEFAULT_FETCH_CONCURRENCY;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid fetch concurrency: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Invalid list size: {0}. Must be at least 1")]
    InvalidListSize(u32),

    #[error("Invalid request timeout: {0}s. Must be at least 1 second")]
    InvalidTimeout(u64),
}

/// rankwatch - daily Tranco ranks for a domain over a date range
#[derive(Parser, Debug)]
#[command(name = "rankwatch")]
#[command(about = "Serve daily Tranco popularity ranks for a domain over a date range")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "RANKWATCH_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Directory holding the front-end files
    #[arg(long, env = "RANKWATCH_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Directory for downloaded lists (defaults to the XDG cache directory)
    #[arg(long, env = "RANKWATCH_CACHE_DIR", conflicts_with = "no_disk_cache")]
    pub cache_dir: Option<PathBuf>,

    /// Do not keep downloaded lists on disk
    #[arg(long)]
    pub no_disk_cache: bool,

    /// Number of daily lists kept in memory (0 disables the in-memory cache)
    #[arg(long, env = "RANKWATCH_CACHE_CAPACITY", default_value_t = MAX_ENTRIES)]
    pub cache_capacity: usize,

    /// Number of dates resolved concurrently within one request (1 is sequential)
    #[arg(long, env = "RANKWATCH_FETCH_CONCURRENCY", default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    pub fetch_concurrency: usize,

    /// Base URL of the Tranco service
    #[arg(long, env = "RANKWATCH_PROVIDER_URL", default_value = TRANCO_BASE_URL)]
    pub provider_url: String,

    /// Number of entries to download per daily list
    #[arg(long, default_value_t = DEFAULT_LIST_SIZE)]
    pub list_size: u32,

    /// Timeout for each provider request, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub request_timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for server startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
    /// Disk cache for provider responses, `None` when disabled or unavailable
    pub disk_cache: Option<CacheManager>,
    pub cache_capacity: usize,
    pub fetch_concurrency: usize,
    pub provider_url: String,
    pub list_size: u32,
    pub request_timeout: Duration,
    pub verbose: bool,
}

impl ServerConfig {
    /// Creates a ServerConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(ServerConfig)` with appropriate settings
    /// * `Err(CliError)` if a numeric setting is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.fetch_concurrency == 0 {
            return Err(CliError::InvalidConcurrency(cli.fetch_concurrency));
        }
        if cli.list_size == 0 {
            return Err(CliError::InvalidListSize(cli.list_size));
        }
        if cli.request_timeout == 0 {
            return Err(CliError::InvalidTimeout(cli.request_timeout));
        }

        let disk_cache = match (&cli.cache_dir, cli.no_disk_cache) {
            (_, true) => None,
            (Some(dir), false) => Some(CacheManager::with_dir(dir.clone())),
            (None, false) => CacheManager::new(),
        };

        Ok(ServerConfig {
            bind: cli.bind,
            static_dir: cli.static_dir.clone(),
            disk_cache,
            cache_capacity: cli.cache_capacity,
            fetch_concurrency: cli.fetch_concurrency,
            provider_url: cli.provider_url.clone(),
            list_size: cli.list_size,
            request_timeout: Duration::from_secs(cli.request_timeout),
            verbose: cli.verbose,
        })
    }
}
