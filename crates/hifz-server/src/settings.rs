//! Runtime configuration, layered from a TOML file and `HIFZ_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::TimeDelta;
use serde::Deserialize;

/// Runtime server configuration. Only `token_secret` is required.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  pub token_secret:    String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours: u32,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3002 }
fn default_store_path() -> PathBuf { PathBuf::from("hifz.db") }
fn default_token_ttl_hours() -> u32 { 72 }

impl ServerConfig {
  /// Read `path` if it exists, then let `HIFZ_*` environment variables
  /// override individual keys (`HIFZ_TOKEN_SECRET`, `HIFZ_PORT`, ...).
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("HIFZ").try_parsing(true))
      .build()
      .context("failed to read config file")?;
    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn token_ttl(&self) -> TimeDelta { TimeDelta::hours(i64::from(self.token_ttl_hours)) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn defaults_fill_everything_but_the_secret() {
    let cfg = parse(r#"token_secret = "s3cret""#).unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 3002);
    assert_eq!(cfg.store_path, PathBuf::from("hifz.db"));
    assert_eq!(cfg.token_ttl(), TimeDelta::hours(72));
  }

  #[test]
  fn secret_is_required() {
    assert!(parse(r#"port = 8080"#).is_err());
  }

  #[test]
  fn explicit_values_win() {
    let cfg = parse(
      r#"
        host            = "0.0.0.0"
        port            = 8080
        store_path      = "/var/lib/hifz/hifz.db"
        token_secret    = "s3cret"
        token_ttl_hours = 12
      "#,
    )
    .unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.token_ttl(), TimeDelta::hours(12));
  }

  #[test]
  fn absolute_paths_are_untouched() {
    assert_eq!(expand_tilde(Path::new("/tmp/hifz.db")), PathBuf::from("/tmp/hifz.db"));
  }
}
