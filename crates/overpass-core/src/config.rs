use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::pipeline::PipelineSettings;
use crate::query::OutputFormat;

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Response cache parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    pub capacity: usize,
    /// Seconds after which a cached response is treated as absent.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Global configuration loaded from `~/.config/overpass/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Interpreter endpoint URL.
    pub endpoint: String,
    /// `[out:<format>]` for every query: "json" or "xml".
    #[serde(default)]
    pub format: OutputFormat,
    /// Server-side query timeout in seconds; 0 omits the `[timeout:N]` clause.
    pub timeout_secs: u64,
    /// Retries after the first attempt for rate-limited or 5xx responses.
    pub max_retries: u32,
    /// Optional User-Agent override for the HTTP transport.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional cache section; if missing, built-in defaults are used.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            format: OutputFormat::Json,
            timeout_secs: 25,
            max_retries: 3,
            user_agent: None,
            cache: None,
        }
    }
}

impl OverpassConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            format: self.format,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("overpass")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<OverpassConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = OverpassConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<OverpassConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: OverpassConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
