use clap::Parser;
use satchel::config::{Config, StorageKind};
use satchel::{MemoryBackend, Registry, db, net::http};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "satchel", about = "Grid inventory engine HTTP server")]
struct Args {
    /// TOML config file; the environment (and .env) is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep everything in memory instead of postgres
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    if args.memory {
        cfg.storage = StorageKind::Memory;
    }
    let cfg = Arc::new(cfg);

    let registry = match cfg.storage {
        StorageKind::Postgres => {
            let db = Arc::new(db::Db::new(&cfg.database_url, cfg.db_pool_size)?);
            db.init().await?;
            Registry::postgres(db, cfg.clone())
        }
        StorageKind::Memory => {
            tracing::warn!("using in-memory storage, nothing will be persisted");
            Registry::memory(&MemoryBackend::new(), cfg.clone())
        }
    };
    let registry = Arc::new(registry);

    let addr: SocketAddr = cfg.http_addr.parse()?;
    tracing::info!(%addr, storage = ?cfg.storage, "satchel http listening");
    if let Err(e) = http::serve(addr, registry).await {
        tracing::error!(error = %e, "http server failed");
        return Err(e.into());
    }

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,satchel=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::uptime()),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();

    Ok(())
}
