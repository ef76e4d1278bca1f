use serde::Deserialize;
use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf};

use crate::storage::MEMORY_LOCATION;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_DB_PATH: &str = "data/staffplan.db";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    /// HS256 signing secret. Empty until [`AppConfig::finalize`] runs.
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// bcrypt cost for newly hashed passwords.
    pub password_cost: u32,
    pub listen_port: u16,
    pub dev_cors_origin: Option<String>,
    /// Prebuilt SPA bundle served for non-API paths.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file path, or `:memory:`.
    pub location: String,
    pub seed_on_empty: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_DB_PATH.to_string(),
            seed_on_empty: false,
        }
    }
}

impl StorageConfig {
    pub fn is_memory(&self) -> bool {
        self.location == MEMORY_LOCATION
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            jwt_secret: String::new(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            password_cost: bcrypt::DEFAULT_COST,
            listen_port: DEFAULT_PORT,
            dev_cors_origin: None,
            static_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "YAML error: {}", e),
            ConfigError::Invalid(m) => write!(f, "invalid config: {}", m),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        ConfigError::Yaml(value)
    }
}

impl AppConfig {
    /// Reads `CONFIG_PATH` (or `config.yaml`), applies environment overrides
    /// and fills in a signing secret if none is configured.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match env::var("CONFIG_PATH") {
            Ok(path) => Self::load_from_path(path)?,
            Err(_) => match Self::load_from_path(DEFAULT_CONFIG_PATH) {
                Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    tracing::info!(path = DEFAULT_CONFIG_PATH, "no config file; using defaults");
                    AppConfig::default()
                }
                other => other?,
            },
        };
        cfg.apply_env_from(|key| env::var(key).ok())?;
        cfg.finalize()?;
        Ok(cfg)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        let cfg: AppConfig = serde_yaml::from_str(&text)?;
        Ok(cfg)
    }

    /// Applies `DB_PATH`, `SEED_ON_EMPTY`, `JWT_SECRET` and `PORT` from `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DB_PATH").filter(|s| !s.is_empty()) {
            self.storage.location = path;
        }
        if let Some(flag) = lookup("SEED_ON_EMPTY") {
            self.storage.seed_on_empty = parse_flag(&flag)
                .ok_or_else(|| ConfigError::Invalid(format!("SEED_ON_EMPTY={flag}")))?;
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.jwt_secret = secret;
        }
        if let Some(port) = lookup("PORT") {
            self.listen_port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT={port}")))?;
        }
        Ok(())
    }

    /// Validates the resolved values and generates a per-process secret when
    /// none was given.
    pub fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid(format!(
                "token_ttl_hours must be positive, got {}",
                self.token_ttl_hours
            )));
        }
        if !(4..=31).contains(&self.password_cost) {
            return Err(ConfigError::Invalid(format!(
                "password_cost must be within 4..=31, got {}",
                self.password_cost
            )));
        }
        if self.jwt_secret.is_empty() {
            tracing::warn!(
                "no jwt_secret configured; generated a random one, tokens will not survive a restart"
            );
            self.jwt_secret = format!(
                "{}{}",
                uuid::Uuid::new_v4().simple(),
                uuid::Uuid::new_v4().simple()
            );
        }
        Ok(())
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
