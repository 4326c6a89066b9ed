//! User configuration management
//!
//! Configuration is stored in TOML format at `~/.townlong-yak/config.toml`.
//! Every field has a default, so a missing file or a partial file is fine.
//!
//! # Examples
//!
//! ```no_run
//! use townlong_yak::{Config, GameFlavour};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::load()?;
//! println!("Catalogue URL: {}", config.endpoints.catalogue_url);
//!
//! config.game_flavour = GameFlavour::Classic;
//! config.save()?;
//! # Ok(())
//! # }
//! ```

use crate::models::GameFlavour;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// User configuration file (`~/.townlong-yak/config.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Game build packages are resolved for
    #[serde(default)]
    pub game_flavour: GameFlavour,

    /// Which upstream API generation the plugin registers
    #[serde(default)]
    pub api: ApiGeneration,

    /// Upstream endpoints
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Upstream API generation
///
/// `Direct` is the original per-alias install-bundle API (plugin 1.0.0);
/// `Catalogue` goes through the WowUp.Hub author catalogue (plugin 1.1.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiGeneration {
    Direct,
    #[default]
    Catalogue,
}

impl fmt::Display for ApiGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiGeneration::Direct => f.write_str("direct"),
            ApiGeneration::Catalogue => f.write_str("catalogue"),
        }
    }
}

impl FromStr for ApiGeneration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "direct" => Ok(ApiGeneration::Direct),
            "catalogue" => Ok(ApiGeneration::Catalogue),
            other => Err(format!(
                "Unknown API generation: {} (expected 'direct' or 'catalogue')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Base URL of the per-alias install-bundle API; the alias is appended
    #[serde(default = "default_install_bundle_url")]
    pub install_bundle_url: String,

    /// WowUp.Hub catalogue listing every add-on by the author
    #[serde(default = "default_catalogue_url")]
    pub catalogue_url: String,
}

fn default_install_bundle_url() -> String {
    "https://www.townlong-yak.com/addons/api/install-bundle".to_string()
}

fn default_catalogue_url() -> String {
    "https://hub.dev.wowup.io/addons/author/foxlit".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            install_bundle_url: default_install_bundle_url(),
            catalogue_url: default_catalogue_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Persist responses on disk; when false an in-memory cache is used
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Cache directory (defaults to `cache/` next to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// How long a fetched catalogue stays fresh
    #[serde(default = "default_catalogue_ttl_minutes")]
    pub catalogue_ttl_minutes: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_catalogue_ttl_minutes() -> u64 {
    15
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            dir: None,
            catalogue_ttl_minutes: default_catalogue_ttl_minutes(),
        }
    }
}

impl CacheConfig {
    pub fn catalogue_ttl(&self) -> Duration {
        Duration::from_secs(self.catalogue_ttl_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("townlong-yak/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_flavour: GameFlavour::default(),
            api: ApiGeneration::default(),
            endpoints: EndpointsConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Get the config directory
    ///
    /// Uses TOWNLONG_YAK_CONFIG_DIR if set, otherwise ~/.townlong-yak
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(config_dir) = std::env::var("TOWNLONG_YAK_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".townlong-yak"))
    }

    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default path, or defaults if it doesn't exist
    ///
    /// Environment variable overrides:
    /// - `TOWNLONG_YAK_GAME_FLAVOUR`: overrides `game_flavour`
    /// - `TOWNLONG_YAK_CONFIG_DIR`: overrides the config directory location
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path()?)?;

        if let Ok(flavour) = std::env::var("TOWNLONG_YAK_GAME_FLAVOUR") {
            if !flavour.is_empty() {
                config.game_flavour = flavour.parse().map_err(Error::Other)?;
            }
        }

        Ok(config)
    }

    /// Load config from a specific file, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolved response cache directory
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).into_owned())),
            None => Ok(Self::config_dir()?.join("cache")),
        }
    }

    /// Set a value by dotted key (e.g. `cache.catalogue_ttl_minutes`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "game_flavour" => self.game_flavour = value.parse().map_err(Error::Other)?,
            "api" => self.api = value.parse().map_err(Error::Other)?,
            "endpoints.install_bundle_url" => {
                self.endpoints.install_bundle_url = parse_url_value(value)?
            }
            "endpoints.catalogue_url" => self.endpoints.catalogue_url = parse_url_value(value)?,
            "cache.enabled" => self.cache.enabled = parse_bool(value)?,
            "cache.dir" => self.cache.dir = Some(value.to_string()),
            "cache.catalogue_ttl_minutes" => {
                self.cache.catalogue_ttl_minutes = value
                    .parse()
                    .map_err(|_| Error::Other(format!("Invalid number of minutes: {}", value)))?
            }
            "http.user_agent" => self.http.user_agent = value.to_string(),
            _ => return Err(Error::Other(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(Error::Other(format!(
            "Invalid boolean value: {} (use true/false)",
            value
        ))),
    }
}

fn parse_url_value(value: &str) -> Result<String> {
    url::Url::parse(value)?;
    Ok(value.trim_end_matches('/').to_string())
}
