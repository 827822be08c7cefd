use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: String,
    pub database_url: String,
    pub max_connections: u32,
    pub allowed_origins: Vec<String>,
    /// Upper bound for `limit` on list endpoints.
    pub max_page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".to_string(),
            database_url: "sqlite://./messaging.sqlite3".to_string(),
            max_connections: 8,
            allowed_origins: Vec::new(),
            max_page_size: 1000,
        }
    }
}

impl Config {
    /// Reads the TOML file at `path`, writing the defaults there first if it is missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
        } else {
            let default_config = Config::default();
            let toml_string = toml::to_string_pretty(&default_config)
                .context("failed to serialize default config")?;
            std::fs::write(path, toml_string)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(default_config)
        }
    }

    pub fn from_env_config() -> anyhow::Result<Self> {
        // A missing .env is fine; the environment may already be set.
        let _ = dotenvy::dotenv();
        let path = std::env::var("MESSAGING_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut final_cfg = Self::load(Path::new(&path))?;
        final_cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(final_cfg)
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(listen) = var("MESSAGING_LISTEN").filter(|v| !v.trim().is_empty()) {
            self.listen = listen;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.listen, "127.0.0.1:8000");
        assert!(path.exists());

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.database_url, cfg.database_url);
        assert_eq!(reloaded.max_page_size, 1000);
    }

    #[test]
    fn load_fills_missing_keys_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "listen = \"0.0.0.0:9000\"\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.listen, "0.0.0.0:9000");
        assert_eq!(cfg.max_connections, 8);
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "listen = [").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "MESSAGING_LISTEN" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.listen, "127.0.0.1:8000");
    }
}
