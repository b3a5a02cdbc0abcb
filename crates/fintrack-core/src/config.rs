//! Application configuration
//!
//! Resolution order, later layers winning:
//! 1. Embedded defaults (compiled into the binary)
//! 2. Override file (`--config`, else ~/.local/share/fintrack/config.toml)
//! 3. Environment variables
//!
//! Command-line flags are applied on top by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/fintrack.toml");

/// Session signing secret
pub const SECRET_KEY_ENV: &str = "FINTRACK_SECRET_KEY";

/// Comma-separated CORS origins
pub const ALLOWED_ORIGINS_ENV: &str = "FINTRACK_ALLOWED_ORIGINS";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Empty = same-origin only
    pub allowed_origins: Vec<String>,
    pub session_ttl_hours: u64,
    pub secret_key: Option<String>,
    pub secure_cookies: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: vec![],
            session_ttl_hours: 24,
            secret_key: None,
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fintrack.db"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintrack").join("config.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    server: Option<RawServer>,
    database: Option<RawDatabase>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
    session_ttl_hours: Option<u64>,
    secret_key: Option<String>,
    secure_cookies: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<PathBuf>,
}

impl AppConfig {
    /// Load defaults, the override file, then the environment
    ///
    /// An explicitly given path must exist; the default override location is
    /// optional.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        config.merge_toml(DEFAULT_CONFIG)?;

        let path = match override_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading config override");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
            config.merge_toml(&content)?;
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML document on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge_toml(content)?;
        Ok(config)
    }

    /// Overlay the keys present in `content`
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(origins) = server.allowed_origins {
                self.server.allowed_origins = origins;
            }
            if let Some(ttl) = server.session_ttl_hours {
                if ttl == 0 {
                    return Err(Error::Config(
                        "session_ttl_hours must be greater than zero".to_string(),
                    ));
                }
                self.server.session_ttl_hours = ttl;
            }
            if let Some(secret) = server.secret_key.filter(|s| !s.is_empty()) {
                self.server.secret_key = Some(secret);
            }
            if let Some(secure) = server.secure_cookies {
                self.server.secure_cookies = secure;
            }
        }

        if let Some(database) = raw.database {
            if let Some(path) = database.path {
                self.database.path = path;
            }
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(SECRET_KEY_ENV).filter(|s| !s.is_empty()) {
            self.server.secret_key = Some(secret);
        }
        if let Some(origins) = lookup(ALLOWED_ORIGINS_ENV) {
            self.server.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}
