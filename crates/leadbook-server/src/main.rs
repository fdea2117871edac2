//! leadbook server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! local SQLite lead store, wires up the WhatsApp conversation source, and
//! serves the JSON API over HTTP. Unless `[auto_import]` disables it, the
//! import worker is armed at boot and its first pass runs immediately.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash` in config.toml:
//!
//! ```
//! cargo run -p leadbook-server --bin server -- --hash-password
//! ```

mod auth;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use leadbook_api::AppState;
use leadbook_source_mysql::{MySqlSource, MySqlSourceConfig};
use leadbook_store_sqlite::SqliteStore;
use leadbook_sync::{DEFAULT_INTERVAL_MINUTES, SyncWorker};
use rand_core::OsRng;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  host:               String,
  port:               u16,
  store_path:         PathBuf,
  auth_username:      String,
  /// PHC string produced by argon2; generate one with `--hash-password`.
  auth_password_hash: String,
  source:             MySqlSourceConfig,
  #[serde(default)]
  auto_import:        AutoImportConfig,
}

/// Whether the import worker is armed at boot, and at what cadence.
#[derive(Deserialize, Clone)]
struct AutoImportConfig {
  #[serde(default = "default_enabled")]
  enabled:          bool,
  #[serde(default = "default_interval")]
  interval_minutes: u64,
}

impl Default for AutoImportConfig {
  fn default() -> Self {
    Self { enabled: true, interval_minutes: DEFAULT_INTERVAL_MINUTES }
  }
}

fn default_enabled() -> bool { true }

fn default_interval() -> u64 { DEFAULT_INTERVAL_MINUTES }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Leadbook lead-management server")]
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
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LEADBOOK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open the SQLite lead store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Build application state.
  let store  = Arc::new(store);
  let source = Arc::new(MySqlSource::new(server_cfg.source.clone()));
  let worker = SyncWorker::new(Arc::clone(&store), Arc::clone(&source));
  let state  = AppState { store, source, worker };

  // Arm the import worker; the first pass runs as soon as we spawn it.
  if server_cfg.auto_import.enabled {
    state
      .worker
      .start(server_cfg.auto_import.interval_minutes)
      .await
      .context("failed to arm auto-import")?;
  } else {
    tracing::info!("auto-import disabled by configuration");
  }

  let auth = Arc::new(AuthConfig {
    username:      server_cfg.auth_username.clone(),
    password_hash: server_cfg.auth_password_hash.clone(),
  });

  let app = leadbook_api::api_router(state)
    .layer(axum::middleware::from_fn_with_state(auth, auth::require_auth))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
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

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  const MINIMAL: &str = r#"
    host               = "127.0.0.1"
    port               = 8080
    store_path         = "leadbook.db"
    auth_username      = "operator"
    auth_password_hash = "$argon2id$v=19$stub"

    [source]
    host     = "db.example.com"
    username = "reader"
    password = "pw"
    database = "whatsapp_bot"
  "#;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn auto_import_defaults_on_at_five_minutes() {
    let cfg = parse(MINIMAL);
    assert!(cfg.auto_import.enabled);
    assert_eq!(cfg.auto_import.interval_minutes, 5);
    assert_eq!(cfg.source.port, 3306);
    assert_eq!(cfg.source.connect_timeout_secs, 10);
  }

  #[test]
  fn auto_import_section_overrides_defaults() {
    let toml =
      format!("{MINIMAL}\n[auto_import]\nenabled = false\ninterval_minutes = 30\n");
    let cfg = parse(&toml);
    assert!(!cfg.auto_import.enabled);
    assert_eq!(cfg.auto_import.interval_minutes, 30);
  }

  #[test]
  fn non_tilde_paths_pass_through() {
    let p = Path::new("/var/lib/leadbook.db");
    assert_eq!(expand_tilde(p), PathBuf::from("/var/lib/leadbook.db"));
  }
}
