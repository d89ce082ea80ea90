//! hifz server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `HIFZ_*`
//! environment variables, opens the SQLite store, and serves the JSON API
//! over HTTP.
//!
//! # Bootstrapping
//!
//! The first admin is created from the command line, with the password read
//! on stdin:
//!
//! ```text
//! cargo run -p hifz-server -- --seed-admin mudir
//! ```
//!
//! `--hash-password` prints an argon2 PHC string without touching the store.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use hifz_api::{AppState, api_router};
use hifz_auth::{TokenCodec, hash_secret};
use hifz_core::{
  store::{RosterStore, StoreFailure as _},
  user::{NewUser, Role},
};
use hifz_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Hifz class and progress server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create an admin with this username (password from stdin) and exit.
  #[arg(long, value_name = "USERNAME", conflicts_with = "hash_password")]
  seed_admin: Option<String>,
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
    let password = read_secret()?;
    println!("{}", hash_secret(&password)?);
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(username) = cli.seed_admin {
    return seed_admin(&store, username).await;
  }

  let tokens = TokenCodec::new(server_cfg.token_secret.clone(), server_cfg.token_ttl())
    .context("invalid token_secret")?;
  let state = AppState::new(Arc::new(store), Arc::new(tokens))?;

  let app = api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn seed_admin(store: &SqliteStore, username: String) -> anyhow::Result<()> {
  let password = read_secret()?;
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }

  let result = store
    .create_user(NewUser {
      username:    username.clone(),
      secret_hash: hash_secret(&password)?,
      role:        Role::Admin,
      phone:       None,
    })
    .await;

  match result {
    Ok(user) => {
      tracing::info!(id = %user.id, %username, "admin created");
      Ok(())
    }
    Err(e) if e.is_conflict() => {
      tracing::warn!(%username, "username already taken; nothing changed");
      Ok(())
    }
    Err(e) => Err(e).context("failed to create admin"),
  }
}

/// Read one line from stdin as the password. The terminal echoes it.
fn read_secret() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
