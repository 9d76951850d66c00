use crate::constants::{CTGOV_EXPORT_URL, EUDRACT_SEARCH_URL};
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "trials.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub eudract_url: String,
    pub ctgov_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            eudract_url: EUDRACT_SEARCH_URL.to_string(),
            ctgov_url: CTGOV_EXPORT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("trials_scraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Libsql,
}

impl FromStr for StorageBackend {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "libsql" => Ok(StorageBackend::Libsql),
            other => Err(ScraperError::Config(format!(
                "unknown storage backend '{other}' (expected memory or libsql)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

impl Config {
    /// Load from `trials.toml` if present, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ScraperError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            toml::from_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(url) = env_string("TRIALS_EUDRACT_URL") {
            self.sources.eudract_url = url;
        }
        if let Some(url) = env_string("TRIALS_CTGOV_URL") {
            self.sources.ctgov_url = url;
        }
        if let Some(secs) = env_parsed::<u64>("TRIALS_HTTP_TIMEOUT_SECS")? {
            self.http.timeout_seconds = secs;
        }
        if let Some(port) = env_parsed::<u16>("TRIALS_PORT")? {
            self.server.port = port;
        }
        if let Some(backend) = env_string("TRIALS_STORAGE") {
            self.storage.backend = backend.parse()?;
        }
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env_string(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScraperError::Config(format!("{key} has an invalid value '{raw}'"))),
        None => Ok(None),
    }
}
