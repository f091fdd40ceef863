//! fakernews server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `FAKERNEWS_*` environment variables, opens the SQLite store and serves the
//! JSON API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use fakernews_server::ServerConfig;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "fakernews API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // Load configuration first: the mode decides the default log level.
  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(cfg.mode.default_log_level().into())
        .from_env_lossy(),
    )
    .init();

  let location = cfg.store_location()?;
  let store = location
    .open()
    .await
    .with_context(|| format!("failed to open store at {location:?}"))?;

  let app = fakernews_server::app(store);
  let address = cfg.address();

  tracing::info!(mode = %cfg.mode, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for Ctrl+C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("shutting down");
}
