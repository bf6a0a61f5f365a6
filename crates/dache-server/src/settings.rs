//! Runtime settings: `config.toml` overlaid with `DACHE_*` variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{Environment, File};
use dache_api::AuthConfig;
use dache_mirror::MirrorConfig;
use serde::Deserialize;

use crate::{Error, Result};

/// Runtime server configuration. Every field has a default, so an absent
/// config file is fine.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  /// Free-form label reported by `/api/health`.
  pub environment:             String,
  pub store_path:              PathBuf,
  pub reconnect_interval_secs: u64,
  pub mirror_enabled:          bool,
  pub mirror_url:              Option<String>,
  pub mirror_timeout_secs:     u64,
  /// Empty, or containing `*`, allows any origin.
  pub allowed_origins:         Vec<String>,
  pub static_dir:              Option<PathBuf>,
  /// Trust `X-Forwarded-For` for the client address. Only enable behind a
  /// reverse proxy that sets it.
  pub trust_proxy:             bool,
  pub admin_username:          Option<String>,
  pub admin_password_hash:     Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                    "0.0.0.0".to_owned(),
      port:                    3000,
      environment:             "development".to_owned(),
      store_path:              PathBuf::from("dache.db"),
      reconnect_interval_secs: 5,
      mirror_enabled:          false,
      mirror_url:              None,
      mirror_timeout_secs:     5,
      allowed_origins:         Vec::new(),
      static_dir:              None,
      trust_proxy:             false,
      admin_username:          None,
      admin_password_hash:     None,
    }
  }
}

impl ServerConfig {
  /// Read `path` (optional) and overlay `DACHE_*` environment variables.
  pub fn load(path: &Path) -> Result<Self> {
    Self::load_with(path, Environment::with_prefix("DACHE"))
  }

  fn load_with(path: &Path, env: Environment) -> Result<Self> {
    let env = env
      .try_parsing(true)
      .list_separator(",")
      .with_list_parse_key("allowed_origins");

    let settings = config::Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(env)
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn static_dir(&self) -> Option<PathBuf> {
    self.static_dir.as_deref().map(expand_tilde)
  }

  pub fn reconnect_interval(&self) -> Duration {
    Duration::from_secs(self.reconnect_interval_secs.max(1))
  }

  pub fn mirror(&self) -> MirrorConfig {
    MirrorConfig {
      enabled: self.mirror_enabled,
      url:     self.mirror_url.clone(),
      // A zero timeout would fail every mirror call.
      timeout: Duration::from_secs(self.mirror_timeout_secs.max(1)),
    }
  }

  /// Admin credentials, if both halves are configured.
  pub fn auth(&self) -> Result<Option<AuthConfig>> {
    match (&self.admin_username, &self.admin_password_hash) {
      (Some(username), Some(password_hash)) => Ok(Some(AuthConfig {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      })),
      (None, None) => Ok(None),
      _ => Err(Error::PartialAuth),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
