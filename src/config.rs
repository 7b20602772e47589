//! Service configuration loaded from TOML.

use crate::constants::{
    DEFAULT_COMPRESSED_DIR, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_PNG_OPTIMIZATION_LEVEL, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SUPPORTED_EXTENSIONS, DEFAULT_UPLOAD_DIR,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub images: ImageConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub compressed_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    pub max_upload_bytes: u64,
    pub supported_extensions: Vec<String>,
    pub png_optimization_level: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            workers: num_cpus::get(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            compressed_dir: PathBuf::from(DEFAULT_COMPRESSED_DIR),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            supported_extensions: DEFAULT_SUPPORTED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            png_optimization_level: DEFAULT_PNG_OPTIMIZATION_LEVEL,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.images.max_upload_bytes == 0 {
            anyhow::bail!("images.max_upload_bytes must be greater than zero");
        }
        if self.images.supported_extensions.is_empty() {
            anyhow::bail!("images.supported_extensions must not be empty");
        }
        if self.server.workers == 0 {
            anyhow::bail!("server.workers must be greater than zero");
        }
        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
