use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::AppError;

pub const ENV_CONFIG: &str = "STAFFPLAN_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    /// Bearer token from the last `login`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_interval")]
    pub poll_interval_secs: u64,
}

fn default_interval() -> u64 {
    60
}

impl ClientConfig {
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: normalize_server_url(server_url),
            token: None,
            poll_interval_secs: default_interval(),
        }
    }

    /// Resolves the config path and loads it.
    pub fn find_and_load(cli_value: Option<PathBuf>) -> Result<(PathBuf, Self), AppError> {
        let path = resolve_config_path(cli_value)?;
        let cfg = load_config(&path)?;
        Ok((path, cfg))
    }

    pub fn token(&self) -> Result<&str, AppError> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Config("not logged in; run `staffplan-client login`".into()))
    }

    pub fn base_url(&self) -> String {
        normalize_server_url(&self.server_url)
    }
}

pub fn resolve_config_path(cli_value: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(p) = cli_value {
        return Ok(p);
    }
    if let Ok(p) = std::env::var(ENV_CONFIG) {
        return Ok(PathBuf::from(p));
    }
    default_config_path().ok_or_else(|| AppError::Config("could not determine config dir".into()))
}

pub fn default_config_path() -> Option<PathBuf> {
    let pd = ProjectDirs::from("dev", "staffplan", "staffplan")?;
    Some(pd.config_dir().join("client.yaml"))
}

pub fn load_config(path: &Path) -> Result<ClientConfig, AppError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("read {} failed: {e}", path.display())))?;
    let cfg: ClientConfig = serde_yaml::from_str(&data)
        .map_err(|e| AppError::Config(format!("parse {} failed: {e}", path.display())))?;
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &ClientConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_yaml::to_string(cfg)
        .map_err(|e| AppError::Config(format!("serialize config failed: {e}")))?;
    std::fs::write(path, data)
        .map_err(|e| AppError::Config(format!("write {} failed: {e}", path.display())))
}

pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", trimmed.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_added_and_trailing_slash_dropped() {
        assert_eq!(normalize_server_url("127.0.0.1:5000/"), "http://127.0.0.1:5000");
        assert_eq!(normalize_server_url(" https://plan.example.com/ "), "https://plan.example.com");
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.yaml");
        let mut cfg = ClientConfig::new("localhost:5000");
        cfg.token = Some("abc".into());
        save_config(&path, &cfg).unwrap();
        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn interval_defaults_when_missing() {
        let cfg: ClientConfig = serde_yaml::from_str("server_url: http://x\n").unwrap();
        assert_eq!(cfg.poll_interval_secs, 60);
        assert!(cfg.token().is_err());
    }
}
