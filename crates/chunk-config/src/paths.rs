use anyhow::Result;
use std::path::{Path, PathBuf};

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("TRAKTCHUNK_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("traktchunk");

        Ok(Self { config_dir: base_dir })
    }

    pub fn from_docker_env() -> Self {
        Self {
            config_dir: container_base_path(),
        }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { config_dir: base }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("traktchunk.toml")
    }

    /// Credential record; keeps the file name earlier deployments mounted.
    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container image creates the base directory, so its presence means we run in Docker
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}
