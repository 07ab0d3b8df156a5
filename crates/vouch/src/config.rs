//! Configuration management for Vouch.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use vouch_common::constants::{
    DEFAULT_CODE_LENGTH, DEFAULT_DATABASE_URL, DEFAULT_REDIS_URL, DEFAULT_WAIT_SECS,
    MAX_CODE_LENGTH,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Redis connection URL (existence cache)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// PostgreSQL connection URL (durable store)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// PostgreSQL pool size
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Discord bot token. Usually supplied through DISCORD_TOKEN.
    #[serde(default)]
    pub discord_token: Option<String>,

    /// Listen address for /health and /ready (disabled when unset)
    #[serde(default)]
    pub health_addr: Option<String>,

    /// Challenge settings
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Discord client settings
    #[serde(default)]
    pub discord: DiscordConfig,
}

/// Challenge-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Length of issued codes in hex characters (1-64)
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// How long the user has to reply, in seconds
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
}

impl VerificationConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            wait_secs: default_wait_secs(),
        }
    }
}

/// Discord client configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordConfig {
    /// Register slash commands in this guild only (instant, for development)
    #[serde(default)]
    pub guild_id: Option<u64>,

    /// Log member joins and leaves. Requires the privileged members intent.
    #[serde(default)]
    pub track_members: bool,
}

// Default value functions
fn default_redis_url() -> String { DEFAULT_REDIS_URL.to_string() }
fn default_database_url() -> String { DEFAULT_DATABASE_URL.to_string() }
fn default_max_connections() -> u32 { 5 }
fn default_code_length() -> usize { DEFAULT_CODE_LENGTH }
fn default_wait_secs() -> u64 { DEFAULT_WAIT_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI/env overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref redis_url) = args.redis_url {
            config.redis_url = redis_url.clone();
        }
        if let Some(ref database_url) = args.database_url {
            config.database_url = database_url.clone();
        }
        if let Some(ref token) = args.discord_token {
            config.discord_token = Some(token.clone());
        }
        if let Some(ref health_addr) = args.health_addr {
            config.health_addr = Some(health_addr.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the bot cannot run with
    pub fn validate(&self) -> Result<()> {
        let length = self.verification.code_length;
        if length == 0 || length > MAX_CODE_LENGTH {
            bail!(
                "verification.code_length must be between 1 and {}, got {}",
                MAX_CODE_LENGTH,
                length
            );
        }
        if self.verification.wait_secs == 0 {
            bail!("verification.wait_secs must be greater than zero");
        }
        if self.discord_token.as_deref().is_none_or(str::is_empty) {
            bail!("Discord token missing: set DISCORD_TOKEN or pass --discord-token");
        }
        Ok(())
    }

    /// Token checked by `validate`
    pub fn token(&self) -> &str {
        self.discord_token.as_deref().unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            database_url: default_database_url(),
            database_max_connections: default_max_connections(),
            discord_token: None,
            health_addr: None,
            verification: VerificationConfig::default(),
            discord: DiscordConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_token() -> AppConfig {
        AppConfig {
            discord_token: Some("token".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = with_token();
        assert_eq!(config.verification.code_length, 8);
        assert_eq!(config.verification.wait(), Duration::from_secs(10));
        assert!(config.health_addr.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        assert!(AppConfig::default().validate().is_err());

        let empty = AppConfig {
            discord_token: Some(String::new()),
            ..Default::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_code_length_bounds() {
        let mut config = with_token();
        config.verification.code_length = 0;
        assert!(config.validate().is_err());

        config.verification.code_length = 65;
        assert!(config.validate().is_err());

        config.verification.code_length = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_wait_rejected() {
        let mut config = with_token();
        config.verification.wait_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                redis_url = "redis://cache:6379"
                discord_token = "abc"

                [verification]
                code_length = 12

                [discord]
                track_members = true
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.redis_url, "redis://cache:6379");
        assert_eq!(config.verification.code_length, 12);
        assert_eq!(config.verification.wait_secs, 10);
        assert!(config.discord.track_members);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }
}
