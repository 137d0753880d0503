//! Hitlog API Server
//!
//! Loads a query log into the date tree, builds the rank index and serves it.
//!
//! Run with: cargo run --bin hitlog -- -p 8080 -f hn_logs.tsv
//!
//! # Configuration
//!
//! Settings come from a TOML file (`-c`, or the default locations), then the
//! `HITLOG_*` environment variables, then the flags below.
//! `RUST_LOG` takes precedence over the configured log level.

use anyhow::Context;
use clap::Parser;
use hitlog::api::{serve, AppState};
use hitlog::config::{Config, LoggingConfig};
use hitlog::ingest::TsvIngester;
use hitlog::tree::DateTree;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hitlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve distinct and popular query counts by date prefix")]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Tab-separated query log to load
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Config file (default: standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(Config::find_default);
    let mut config = Config::load_from(config_path.as_deref())?;
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(file) = args.file {
        config.ingest.file = file;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting Hitlog v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let ingest = config.ingest.clone();
    let tree = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let started = Instant::now();
        let mut tree = DateTree::new();

        let report = TsvIngester::new()
            .with_timestamp_format(&ingest.timestamp_format)
            .ingest_path(&ingest.file, &mut tree)
            .with_context(|| format!("Failed to load {:?}", ingest.file))?;

        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Log file loaded"
        );

        let started = Instant::now();
        let tree = tree.build_index();
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rank index built"
        );

        Ok(tree)
    })
    .await??;

    tracing::info!("Total count: {}", tree.total_count());
    tracing::info!("Index stats: {}", tree.stats());

    serve(AppState::new(Arc::new(tree)), &config.api).await?;

    tracing::info!("Hitlog stopped");
    Ok(())
}

/// Install the global subscriber
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("hitlog={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
