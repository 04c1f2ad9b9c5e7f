//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a single TOML file. Every field has a built-in
//! default, so a missing file is not fatal: the loader logs a warning and
//! continues with defaults. A file that exists but cannot be parsed is an
//! error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MARQUEE_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Library browsing configuration
    #[serde(default)]
    pub library: LibraryConfig,

    /// Statistics configuration
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Library (saved artists) browsing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Content-source filter id selecting saved artists
    #[serde(default = "default_artist_filter")]
    pub artist_filter: String,

    /// Distinct query keys whose pages stay cached; older keys are evicted
    #[serde(default = "default_cached_queries")]
    pub cached_queries: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            artist_filter: default_artist_filter(),
            cached_queries: default_cached_queries(),
        }
    }
}

/// Listening statistics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Maximum number of ranked tracks aggregated per time window
    #[serde(default = "default_ranking_limit")]
    pub ranking_limit: usize,

    /// Maximum ids per feature-service request
    #[serde(default = "default_feature_batch_size")]
    pub feature_batch_size: usize,

    /// Feature dimensions every analysis must contain
    #[serde(default = "default_feature_dimensions")]
    pub feature_dimensions: Vec<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            ranking_limit: default_ranking_limit(),
            feature_batch_size: default_feature_batch_size(),
            feature_dimensions: default_feature_dimensions(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> u32 {
    200
}

fn default_artist_filter() -> String {
    "1".to_string()
}

fn default_cached_queries() -> usize {
    8
}

fn default_ranking_limit() -> usize {
    50
}

fn default_feature_batch_size() -> usize {
    100
}

fn default_feature_dimensions() -> Vec<String> {
    [
        "danceability",
        "energy",
        "speechiness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "valence",
        "tempo",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl TomlConfig {
    /// Reject values the pipelines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.library.page_size == 0 {
            return Err(Error::Config("library.page_size must be positive".to_string()));
        }
        if self.library.cached_queries == 0 {
            return Err(Error::Config(
                "library.cached_queries must be positive".to_string(),
            ));
        }
        if self.stats.ranking_limit == 0 {
            return Err(Error::Config("stats.ranking_limit must be positive".to_string()));
        }
        if self.stats.feature_batch_size == 0 {
            return Err(Error::Config(
                "stats.feature_batch_size must be positive".to_string(),
            ));
        }
        if self.stats.feature_dimensions.is_empty() {
            return Err(Error::Config(
                "stats.feature_dimensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Write a config file (used by tests and first-run bootstrap)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Config file resolution following priority order:
/// 1. Explicit path argument (highest priority)
/// 2. Environment variable
/// 3. Platform config directory
///
/// Returns `None` when no candidate exists on disk.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: explicit argument
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: ~/.config/marquee/config.toml (or platform equivalent)
    dirs::config_dir()
        .map(|d| d.join("marquee").join("config.toml"))
        .filter(|p| p.exists())
}

/// Resolve and load configuration, falling back to compiled defaults
///
/// A missing file logs a warning and yields defaults. A present but invalid
/// file is returned as an error.
pub fn load_or_default(explicit: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(explicit) else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using built-in defaults");
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
