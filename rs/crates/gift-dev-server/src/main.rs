use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gift_client::{ClientConfig, ClientContext};
use gift_dev_server::{router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gift-dev-server", about = "Serve the gift shop pages over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 3001)]
    port: u16,
    /// Backend base URL (overrides GIFT_API_BASE_URL)
    #[arg(long)]
    api_base: Option<String>,
    /// Preferences file (overrides GIFT_PREFS_PATH)
    #[arg(long)]
    prefs: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = ClientConfig::from_env().context("reading client config")?;
    if let Some(url) = args.api_base {
        config.api_base_url = url;
    }
    if let Some(path) = args.prefs {
        config.prefs_path = path;
    }

    let (ctx, notices) = ClientContext::from_config(&config).context("building client")?;
    let app = router(Arc::new(AppState::new(ctx, notices)));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind failed: {}", addr))?;

    info!(port = args.port, api = %config.api_base_url, "gift-dev-server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
