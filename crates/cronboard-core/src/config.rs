use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::JobDescriptor;

pub const ENV_PREFIX: &str = "CRONBOARD_";

/// Top-level config (cronboard.toml + CRONBOARD_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CronboardConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    /// The job catalog, in declaration order.
    #[serde(default)]
    pub jobs: Vec<JobDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronboard/cronboard.db", home)
}

pub fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronboard/cronboard.toml", home)
}

impl CronboardConfig {
    /// Load config from a TOML file with CRONBOARD_* env var overrides.
    ///
    /// A missing file is not an error; figment falls back to the serialized
    /// defaults, so the result is an empty catalog.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        if !std::path::Path::new(&path).exists() {
            tracing::warn!(%path, "config file not found, using defaults");
        }

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::CronboardError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(CronboardConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("_"))
    }

    /// Parse a TOML document directly, without env overrides.
    pub fn from_toml_str(toml: &str) -> crate::error::Result<Self> {
        Figment::from(Serialized::defaults(CronboardConfig::default()))
            .merge(Toml::string(toml))
            .extract()
            .map_err(|e| crate::error::CronboardError::Config(e.to_string()))
    }
}
