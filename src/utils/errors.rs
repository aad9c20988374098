//! Error handling for SocietyBot
//!
//! This module defines the main error types used throughout the application
//! and the closed set of business failures returned by the persistence
//! gateway.

use thiserror::Error;

/// Main error type for the SocietyBot application
#[derive(Error, Debug)]
pub enum SocietyBotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Business failures of the persistence gateway.
///
/// Every mutating gateway operation returns one of these; callers
/// pattern-match instead of catching a generic storage error. Raw sqlx
/// errors only ever surface as [`GatewayError::Storage`] and are logged
/// at the gateway boundary before being returned.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("event not found: {name}")]
    EventNotFound { name: String },

    #[error("event is at capacity: {name}")]
    CapacityExceeded { name: String },

    #[error("user {user_id} is already registered for {name}")]
    DuplicateRegistration { user_id: i64, name: String },

    #[error("daily message quota exhausted for user {user_id}")]
    DailyQuotaExceeded { user_id: i64 },

    #[error("an event named {name} already exists")]
    DuplicateEvent { name: String },

    #[error("event {id} still has registrations")]
    HasActiveRegistrations { id: i64 },

    #[error("capacity cannot drop below the registered count")]
    CapacityBelowRegistered,

    #[error("registration {id} not found for this user")]
    RegistrationNotFound { id: i64 },

    #[error("message {id} not found")]
    MessageNotFound { id: i64 },

    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

impl GatewayError {
    /// Whether the failure is a transient infrastructure problem rather
    /// than a business-rule violation. Transient failures get the generic
    /// retry-later message; business failures get their own text.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Storage(_))
    }
}

/// Result type alias for SocietyBot operations
pub type Result<T> = std::result::Result<T, SocietyBotError>;

/// Result type alias for persistence-gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
