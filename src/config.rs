use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Defaults applied when the config file leaves a section out.
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_TTL_MINUTES: i64 = 5;
const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub lists: ListConfig,
  #[serde(default)]
  pub comments: CommentsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Base URL of the REST backend, e.g. "https://pm.example.com/api/".
  pub url: String,
  /// Client-side timeout per request, surfaced as a network error on expiry.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// How long cached list results stay fresh.
  #[serde(default = "default_cache_ttl_minutes")]
  pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListConfig {
  /// Default page size for list controllers.
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentsConfig {
  /// Override path for the comment database (defaults to the XDG data dir).
  pub db_path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
  DEFAULT_TIMEOUT_SECS
}

fn default_cache_ttl_minutes() -> i64 {
  DEFAULT_CACHE_TTL_MINUTES
}

fn default_page_size() -> usize {
  DEFAULT_PAGE_SIZE
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
    }
  }
}

impl Default for ListConfig {
  fn default() -> Self {
    Self {
      page_size: DEFAULT_PAGE_SIZE,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./boardkit.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/boardkit/config.yaml
  /// 4. ~/.config/boardkit/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/boardkit/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("boardkit.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("boardkit").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the backend API token from environment variables.
  ///
  /// Checks BOARDKIT_API_TOKEN first, then BOARDKIT_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("BOARDKIT_API_TOKEN")
      .or_else(|_| std::env::var("BOARDKIT_TOKEN"))
      .map_err(|_| {
        eyre!("API token not found. Set BOARDKIT_API_TOKEN or BOARDKIT_TOKEN environment variable.")
      })
  }

  /// Cache TTL as a duration.
  pub fn cache_ttl(&self) -> chrono::Duration {
    chrono::Duration::minutes(self.cache.ttl_minutes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_config_fills_defaults() {
    let config = Config::parse("backend:\n  url: https://pm.example.com/api/\n").unwrap();

    assert_eq!(config.backend.url, "https://pm.example.com/api/");
    assert_eq!(config.backend.timeout_secs, 15);
    assert_eq!(config.cache.ttl_minutes, 5);
    assert_eq!(config.lists.page_size, 25);
    assert!(config.comments.db_path.is_none());
  }

  #[test]
  fn explicit_values_override_defaults() {
    let yaml = "\
backend:
  url: http://localhost:8080/
  timeout_secs: 3
cache:
  ttl_minutes: 1
lists:
  page_size: 10
comments:
  db_path: /tmp/comments.db
";
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.backend.timeout_secs, 3);
    assert_eq!(config.cache_ttl(), chrono::Duration::minutes(1));
    assert_eq!(config.lists.page_size, 10);
    assert_eq!(
      config.comments.db_path.as_deref(),
      Some(Path::new("/tmp/comments.db"))
    );
  }
}
