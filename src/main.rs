//! rankwatch - daily Tranco ranks for a domain over a date range
//!
//! Starts an HTTP server exposing `GET /api/ranks` and the static front end.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rankwatch::cache::RankingCache;
use rankwatch::cli::{Cli, ServerConfig};
use rankwatch::data::TrancoClient;
use rankwatch::resolver::RankResolver;
use rankwatch::server::{self, RankService, SharedProvider, StaticFiles};

/// Initializes the tracing subscriber; `RUST_LOG` overrides the default filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "rankwatch=debug,hyper=info"
    } else {
        "rankwatch=info,hyper=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).compact())
        .init();
}

/// Resolves once Ctrl-C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    init_tracing(config.verbose);

    match config.disk_cache {
        Some(ref cache) => info!(dir = %cache.dir().display(), "disk cache enabled"),
        None => info!("disk cache disabled"),
    }
    info!(
        static_dir = %config.static_dir.display(),
        provider = %config.provider_url,
        cache_capacity = config.cache_capacity,
        fetch_concurrency = config.fetch_concurrency,
        "starting rankwatch"
    );

    let provider: SharedProvider = Arc::new(
        TrancoClient::builder()
            .cache_manager(config.disk_cache.clone())
            .base_url(config.provider_url.clone())
            .list_size(config.list_size)
            .timeout(config.request_timeout)
            .build(),
    );
    let resolver = RankResolver::new(provider, RankingCache::new(config.cache_capacity))
        .with_concurrency(config.fetch_concurrency);
    let service = Arc::new(RankService::new(
        resolver,
        StaticFiles::new(config.static_dir.clone()),
    ));

    let (_addr, server) = server::bind(config.bind, service, shutdown_signal())?;
    server.await?;

    Ok(())
}
