//! dache-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), supervises the
//! SQLite store, and serves the inquiry API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```
//! cargo run -p dache-server -- --hash-password
//! ```

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use dache_api::AppState;
use dache_mirror::WebhookMirror;
use dache_server::ServerConfig;
use dache_store_sqlite::SupervisedStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Dache inquiry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let config = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  let auth = config.auth().context("invalid admin credentials")?;
  if auth.is_none() {
    tracing::warn!("admin routes are open; set admin_username and admin_password_hash");
  }

  let mirror = WebhookMirror::new(&config.mirror()).context("failed to build mirror client")?;
  if !mirror.is_configured() {
    tracing::warn!("mirror not configured; inquiries are stored locally only");
  }

  let store_path = config.store_path();
  tracing::info!(path = %store_path.display(), "opening store");
  let (store, supervisor) = SupervisedStore::spawn(&store_path, config.reconnect_interval());

  let state = AppState {
    store:       Arc::new(store),
    mirror:      Arc::new(mirror),
    auth:        auth.map(Arc::new),
    environment: Arc::from(config.environment.as_str()),
    trust_proxy: config.trust_proxy,
  };
  let app = dache_server::app(state, &config).context("failed to build router")?;

  let address = config.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!(environment = %config.environment, "Listening on http://{address}");

  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .with_graceful_shutdown(shutdown_signal())
  .await
  .context("server error")?;

  supervisor.shutdown().await.context("failed to close store")?;
  tracing::info!("store closed");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
