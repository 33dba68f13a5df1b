//! Configuration schema for xbps-prune
//!
//! Configuration is stored at `~/.config/xbps-prune/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default XBPS cache location
pub const DEFAULT_CACHE_DIR: &str = "/var/cache/xbps";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache location
    pub cache: CacheConfig,

    /// Package query settings
    pub query: QueryConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding package archives (overridden by -c)
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

/// Package query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Query program
    pub command: PathBuf,

    /// Alternate root directory passed as `-r`
    pub rootdir: Option<PathBuf>,

    /// Maximum concurrent dependency queries
    pub parallelism: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("xbps-query"),
            rootdir: None,
            parallelism: 4,
        }
    }
}
