use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use triage_api::{router, AppState, FsObjectStore, HfClassifier, ServiceConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address (overrides TRIAGE_BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Object store root directory (overrides UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Base URL clients use to reach this service (overrides TRIAGE_PUBLIC_BASE_URL)
    #[arg(long)]
    public_base_url: Option<String>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match &args.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triage_api=info,triage_engine=info,tower_http=info".into()),
        )
        .init();

    let mut config = ServiceConfig::from_env().context("Invalid service configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.upload_dir {
        config.upload_dir = dir;
    }
    if let Some(url) = args.public_base_url {
        config.public_base_url = url.trim_end_matches('/').to_string();
    }

    let store = FsObjectStore::open(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to open object store at {}", config.upload_dir.display()))?;
    let classifier =
        HfClassifier::new(config.classifier.clone()).context("Failed to build classifier client")?;

    info!(
        bind = %config.bind_addr,
        store = %config.upload_dir.display(),
        classifier = %classifier.endpoint(),
        threshold = config.triage.confidence_threshold,
        "Triage API starting"
    );

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, Arc::new(store), Arc::new(classifier))
        .context("Invalid triage configuration")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Triage API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
