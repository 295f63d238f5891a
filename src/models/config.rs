//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and tree expansion settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Remote endpoints
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Database and output locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults only when the file is absent.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No config at {:?}, using defaults", path.as_ref());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load a file that must exist, then validate it.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = match Self::load(path) {
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::config(format!("{} not found", path.display())));
            }
            other => other?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.client.user_agent.trim().is_empty() {
            return Err(AppError::validation("client.user_agent is empty"));
        }
        if self.client.timeout_secs == 0 {
            return Err(AppError::validation("client.timeout_secs must be > 0"));
        }
        if self.client.max_concurrent == 0 {
            return Err(AppError::validation("client.max_concurrent must be > 0"));
        }
        if self.client.max_children_per_level == 0 {
            return Err(AppError::validation(
                "client.max_children_per_level must be > 0",
            ));
        }
        for (name, value) in [
            ("sources.api_base", &self.sources.api_base),
            ("sources.digest_base", &self.sources.digest_base),
            ("sources.frontpage_base", &self.sources.frontpage_base),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::validation(format!("{name} is not a URL: {e}")))?;
        }
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(AppError::validation("storage.db_path is empty"));
        }
        Ok(())
    }

    /// Directory where generated issues are written.
    pub fn issues_dir(&self) -> PathBuf {
        self.storage.data_dir.join("issues")
    }
}

/// HTTP client and tree expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum in-flight item fetches per story
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Replies expanded under each node; the rest are skipped
    #[serde(default = "defaults::max_children_per_level")]
    pub max_children_per_level: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_children_per_level: defaults::max_children_per_level(),
        }
    }
}

/// Remote endpoints for items and best-story listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Base URL of the item API (`{api_base}/item/{id}.json`)
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Base URL of the daily digest archive (`{digest_base}/{YYYY-MM-DD}.html`)
    #[serde(default = "defaults::digest_base")]
    pub digest_base: String,

    /// Front page archive (`{frontpage_base}?day=YYYY-MM-DD&p=N`)
    #[serde(default = "defaults::frontpage_base")]
    pub frontpage_base: String,

    /// Extra front page archive pages to read per day
    #[serde(default = "defaults::frontpage_pages")]
    pub frontpage_pages: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            digest_base: defaults::digest_base(),
            frontpage_base: defaults::frontpage_base(),
            frontpage_pages: defaults::frontpage_pages(),
        }
    }
}

/// On-disk locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root for generated issues
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    /// SQLite database file
    #[serde(default = "defaults::db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            db_path: defaults::db_path(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Client defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; hnpress/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn max_children_per_level() -> usize {
        10
    }

    // Source defaults
    pub fn api_base() -> String {
        "https://hacker-news.firebaseio.com/v0".into()
    }
    pub fn digest_base() -> String {
        "http://www.daemonology.net/hn-daily".into()
    }
    pub fn frontpage_base() -> String {
        "https://news.ycombinator.com/front".into()
    }
    pub fn frontpage_pages() -> u32 {
        3
    }

    // Storage defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn db_path() -> PathBuf {
        PathBuf::from("data/hnpress.db")
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
