//! Configuration loading and validation.
//!
//! Values come from an optional TOML file and are then overridden by
//! environment variables, so secrets like the Riot API key never have to
//! live in the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::models::RiotId;
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Riot API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// Development or production key, sent as `X-Riot-Token`
    #[serde(default)]
    pub api_key: String,

    /// Regional routing value for account-v1 (americas, europe, asia)
    #[serde(default = "default_account_region")]
    pub account_region: String,

    /// Platform routing value for summoner/league/mastery (br1, na1, euw1, ...)
    #[serde(default = "default_platform_region")]
    pub platform_region: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Send every request to this base URL instead of the Riot hosts
    #[serde(default)]
    pub base_url_override: Option<String>,
}

fn default_account_region() -> String {
    "americas".to_string()
}

fn default_platform_region() -> String {
    "br1".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            account_region: default_account_region(),
            platform_region: default_platform_region(),
            timeout_seconds: default_timeout(),
            base_url_override: None,
        }
    }
}

/// Background refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Pause between full refresh cycles (e.g. "30m", "15m")
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// Pause between two players, to stay under the Riot rate limit
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Players reconciled at startup
    #[serde(default)]
    pub seed_players: Vec<RiotId>,

    /// Attempts at opening the store before giving up
    #[serde(default = "default_startup_retries")]
    pub startup_retries: u32,
}

fn default_refresh_interval() -> String {
    "30m".to_string()
}

fn default_request_delay() -> u64 {
    1500
}

fn default_startup_retries() -> u32 {
    10
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            request_delay_ms: default_request_delay(),
            seed_players: Vec::new(),
            startup_retries: default_startup_retries(),
        }
    }
}

impl SyncSettings {
    pub fn refresh_interval(&self) -> Option<Duration> {
        parse_duration(&self.refresh_interval)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub riot: RiotConfig,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            riot: RiotConfig::default(),
            sync: SyncSettings::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Read `path` if it exists, else defaults, then apply the environment.
    /// Does not validate.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// [`resolve`](Self::resolve) and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::resolve(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables.
    ///
    /// `lookup` is injectable so tests do not touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("RIOT_API_KEY") {
            self.riot.api_key = key.trim().to_string();
        }
        if let Some(region) = lookup("RIOT_ACCOUNT_REGION") {
            self.riot.account_region = region;
        }
        if let Some(region) = lookup("RIOT_PLATFORM_REGION") {
            self.riot.platform_region = region;
        }
        if let Some(interval) = lookup("REFRESH_INTERVAL") {
            self.sync.refresh_interval = interval;
        }
        if let Some(delay) = lookup("REQUEST_DELAY_MS") {
            self.sync.request_delay_ms = delay.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("REQUEST_DELAY_MS is not a number: {}", delay))
            })?;
        }
        if let Some(seed) = lookup("SEED_PLAYERS") {
            self.sync.seed_players = parse_seed_list(&seed)?;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.riot.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Riot API key is missing (set RIOT_API_KEY)".to_string(),
            ));
        }

        if self.riot.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Riot timeout must be greater than 0".to_string(),
            ));
        }

        match self.sync.refresh_interval() {
            Some(d) if !d.is_zero() => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid refresh interval: {}",
                    self.sync.refresh_interval
                )))
            }
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse `Name#Tag,Other Name#Tag2`.
pub fn parse_seed_list(s: &str) -> Result<Vec<RiotId>, ConfigError> {
    s.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<RiotId>()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.riot.api_key = "RGAPI-test".to_string();
        config
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.riot.account_region, "americas");
        assert_eq!(config.riot.platform_region, "br1");
        assert_eq!(config.sync.refresh_interval(), Some(Duration::from_secs(1800)));
        assert_eq!(config.sync.request_delay(), Duration::from_millis(1500));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        assert!(AppConfig::default().validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_interval() {
        let mut config = valid_config();
        config.sync.refresh_interval = "soon".to_string();
        assert!(config.validate().is_err());

        config.sync.refresh_interval = "0m".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("RIOT_API_KEY", " RGAPI-abc "),
                ("REFRESH_INTERVAL", "15m"),
                ("REQUEST_DELAY_MS", "2000"),
                ("SEED_PLAYERS", "Larapio#Larap, Sabor Sixty#Sabor"),
                ("RIOT_PLATFORM_REGION", ""),
            ]))
            .unwrap();

        assert_eq!(config.riot.api_key, "RGAPI-abc");
        assert_eq!(config.riot.platform_region, "br1");
        assert_eq!(config.sync.refresh_interval(), Some(Duration::from_secs(900)));
        assert_eq!(config.sync.request_delay_ms, 2000);
        assert_eq!(
            config.sync.seed_players,
            vec![
                RiotId::new("Larapio", "Larap"),
                RiotId::new("Sabor Sixty", "Sabor")
            ]
        );
    }

    #[test]
    fn test_apply_env_rejects_bad_delay() {
        let mut config = AppConfig::default();
        let result = config.apply_env(env(&[("REQUEST_DELAY_MS", "fast")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_seed_list_rejects_malformed() {
        assert!(parse_seed_list("Larapio#Larap,broken").is_err());
        assert!(parse_seed_list("").unwrap().is_empty());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r##"
            [riot]
            api_key = "RGAPI-file"
            platform_region = "na1"

            [sync]
            refresh_interval = "15m"
            seed_players = [
                { game_name = "Naju", tag_line = "Anaju" },
            ]
        "##;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.riot.platform_region, "na1");
        assert_eq!(config.riot.account_region, "americas");
        assert_eq!(config.sync.seed_players, vec![RiotId::new("Naju", "Anaju")]);
        assert_eq!(config.sync.request_delay_ms, 1500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = valid_config();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(parsed.riot.api_key, "RGAPI-test");
    }

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig =
            toml::from_str(include_str!("../../config.example.toml")).unwrap();

        assert_eq!(config.sync.seed_players.len(), 10);
        assert_eq!(
            config.sync.seed_players[0],
            RiotId::new("Larapio", "Larap")
        );
        assert_eq!(
            config.sync.seed_players[7],
            RiotId::new("u fear cold mind", "5145")
        );
        assert!(config.riot.api_key.is_empty());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::resolve(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
