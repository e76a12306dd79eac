use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Service configuration, loaded from TOML. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Send the record's `client_id` as `trakt-api-key`.
    #[serde(default = "default_true")]
    pub send_api_key: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// How the served window moves as intervals elapse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowPolicy {
    /// Non-overlapping pages: interval `n` serves `[n*chunk, (n+1)*chunk)`.
    #[default]
    Sliding,
    /// Reveal schedule: always starts at the first item and grows each interval.
    Cumulative,
}

impl std::str::FromStr for WindowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sliding" => Ok(WindowPolicy::Sliding),
            "cumulative" => Ok(WindowPolicy::Cumulative),
            _ => Err(format!("Invalid window policy: {}. Use 'sliding' or 'cumulative'", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default)]
    pub policy: WindowPolicy,
    /// Sort by `listed_at` even when the request carries no `dir`.
    #[serde(default)]
    pub sort_by_listed_at: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_bind() -> String {
    "0.0.0.0:5252".to_string()
}

fn default_api_base() -> String {
    "https://api.trakt.tv".to_string()
}

fn default_token_url() -> String {
    "https://api.trakt.tv/oauth/token".to_string()
}

fn default_api_version() -> String {
    "2".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("traktchunk/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_url: default_token_url(),
            api_version: default_api_version(),
            send_api_key: default_true(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServiceConfig {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing file yields defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr()?;

        if self.trakt.timeout_secs == 0 {
            return Err(anyhow::anyhow!("trakt.timeout_secs must be positive"));
        }

        if self.trakt.api_version.trim().is_empty() {
            return Err(anyhow::anyhow!("trakt.api_version cannot be empty"));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid server.bind '{}': {}", self.server.bind, e))
    }

    /// `[credentials].path`, then `CONFIG_PATH`, then `fallback`.
    pub fn credentials_path(&self, fallback: PathBuf) -> PathBuf {
        if let Some(path) = &self.credentials.path {
            return path.clone();
        }
        std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or(fallback)
    }
}
