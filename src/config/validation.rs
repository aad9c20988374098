//! Configuration validation module
//!
//! Missing or malformed required settings abort startup here rather than
//! failing later at first use.

use crate::utils::errors::{Result, SocietyBotError};

use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_society_config(&settings.society)?;
    validate_channel_config(&settings.channel)?;
    validate_database_config(&settings.database)?;
    validate_limits_config(&settings.limits)?;
    validate_logging_config(&settings.logging)?;
    Ok(())
}

fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(SocietyBotError::Config("Bot token is required".to_string()));
    }

    if config.admin_ids.is_empty() {
        return Err(SocietyBotError::Config(
            "At least one admin chat id must be configured".to_string(),
        ));
    }

    if let Some(proxy_url) = &config.proxy_url {
        url::Url::parse(proxy_url)
            .map_err(|e| SocietyBotError::Config(format!("Invalid proxy URL: {e}")))?;
    }

    Ok(())
}

fn validate_society_config(config: &super::SocietyConfig) -> Result<()> {
    if config.name.is_empty() {
        return Err(SocietyBotError::Config(
            "Society name is required".to_string(),
        ));
    }

    if config.university.is_empty() {
        return Err(SocietyBotError::Config(
            "University name is required".to_string(),
        ));
    }

    if config.contact_email.is_empty() || config.contact_phone.is_empty() {
        return Err(SocietyBotError::Config(
            "Society contact email and phone are required".to_string(),
        ));
    }

    Ok(())
}

fn validate_channel_config(config: &super::ChannelConfig) -> Result<()> {
    if config.id == 0 {
        return Err(SocietyBotError::Config(
            "Channel id is required".to_string(),
        ));
    }

    if config.url.is_empty() || config.username.is_empty() {
        return Err(SocietyBotError::Config(
            "Channel URL and username are required".to_string(),
        ));
    }

    url::Url::parse(&config.url)
        .map_err(|e| SocietyBotError::Config(format!("Invalid channel URL: {e}")))?;

    Ok(())
}

fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.path.is_empty() {
        return Err(SocietyBotError::Config(
            "Database path is required".to_string(),
        ));
    }

    if config.max_connections == 0 {
        return Err(SocietyBotError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_limits_config(config: &super::LimitsConfig) -> Result<()> {
    if config.max_messages_per_day <= 0 {
        return Err(SocietyBotError::Config(
            "Daily message quota must be greater than 0".to_string(),
        ));
    }

    if config.membership_checks == 0 || config.membership_window_secs == 0 {
        return Err(SocietyBotError::Config(
            "Membership rate-limit window must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(SocietyBotError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123:token".to_string();
        settings.bot.admin_ids = vec![42];
        settings.channel.id = -100_1234;
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut settings = valid_settings();
        settings.bot.token = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_missing_admins_rejected() {
        let mut settings = valid_settings();
        settings.bot.admin_ids.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bad_proxy_url_rejected() {
        let mut settings = valid_settings();
        settings.bot.proxy_url = Some("not a url".to_string());
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_zero_quota_rejected() {
        let mut settings = valid_settings();
        settings.limits.max_messages_per_day = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
