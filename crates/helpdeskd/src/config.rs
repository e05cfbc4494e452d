//! Configuration management for helpdeskd.
//!
//! Loads settings from /etc/helpdesk/config.toml (or an explicit path) and
//! applies environment overrides. Every field has a default, so a missing or
//! partial file still yields a usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/helpdesk/config.toml";

/// Fallback config file path
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/helpdesk/config.toml";

/// Environment override for the listen address
pub const ENV_BIND: &str = "HELPDESK_BIND";

/// Environment override for the database path
pub const ENV_DB: &str = "HELPDESK_DB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// How long a writer waits for the database lock before failing
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/var/lib/helpdesk/helpdesk.db")
}

fn default_busy_timeout() -> u64 {
    5_000
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive; RUST_LOG wins when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load config from an explicit path, or the standard locations, then
    /// apply environment overrides. An explicit path that fails to load is
    /// an error; missing standard files fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => Self::load_from_path(Path::new(CONFIG_PATH))
                .or_else(|_| Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH)))
                .unwrap_or_else(|e| {
                    warn!("Config not found, using defaults: {}", e);
                    Config::default()
                }),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind_addr = bind;
        }
        if let Some(db) = lookup(ENV_DB) {
            self.database.path = PathBuf::from(db);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
[database]
path = "/tmp/helpdesk-test.db"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/helpdesk-test.db"));
        // Defaults for missing fields
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_BIND => Some("0.0.0.0:8080".to_string()),
            ENV_DB => Some("/data/hd.db".to_string()),
            _ => None,
        });
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.database.path, PathBuf::from("/data/hd.db"));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nbind_addr = \"127.0.0.1:9999\"\n[log]\nlevel = \"debug\"\n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9999");
        assert_eq!(config.log.level, "debug");
    }
}
