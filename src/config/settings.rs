//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub society: SocietyConfig,
    pub channel: ChannelConfig,
    pub database: DatabaseConfig,
    pub limits: LimitsConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub admin_ids: Vec<i64>,
    pub proxy_url: Option<String>,
}

/// Display names and contact details of the society
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SocietyConfig {
    pub name: String,
    pub university: String,
    pub contact_email: String,
    pub contact_phone: String,
}

/// The channel whose membership gates the bot's features
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    pub id: i64,
    pub url: String,
    pub username: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
}

/// Abuse-protection limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Contact messages accepted per user per calendar day
    pub max_messages_per_day: i64,
    /// Membership checks allowed per user per sliding window
    pub membership_checks: u32,
    /// Length of the membership-check window in seconds
    pub membership_window_secs: u64,
}

/// Liveness endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthConfig {
    pub enabled: bool,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// Load settings from the optional configuration file and environment
    /// variables (`SOCIETYBOT_` prefix, `__` section separator).
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("SOCIETYBOT")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::SocietyBotError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_ids: vec![],
                proxy_url: None,
            },
            society: SocietyConfig {
                name: "انجمن علمی مهندسی ساخت و تولید".to_string(),
                university: "دانشگاه محقق اردبیلی".to_string(),
                contact_email: "info@uma.ac.ir".to_string(),
                contact_phone: "+0123456789".to_string(),
            },
            channel: ChannelConfig {
                id: 0,
                url: "https://t.me/UMA_manufacturing402".to_string(),
                username: "@UMA_manufacturing402".to_string(),
            },
            database: DatabaseConfig {
                path: "data/bot.db".to_string(),
                max_connections: 5,
            },
            limits: LimitsConfig {
                max_messages_per_day: 1,
                membership_checks: 5,
                membership_window_secs: 600,
            },
            health: HealthConfig {
                enabled: true,
                port: 10000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
