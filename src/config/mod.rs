//! Configuration management

pub mod settings;
pub mod validation;

pub use settings::{
    BotConfig, ChannelConfig, DatabaseConfig, HealthConfig, LimitsConfig, LoggingConfig,
    Settings, SocietyConfig,
};
