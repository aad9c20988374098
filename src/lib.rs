//! SocietyBot Telegram Bot
//!
//! A Telegram bot for a university engineering society: members register
//! for events and workshops through a multi-step conversation, browse
//! announcements, contact the administrators, and manage their
//! registrations, all gated by a channel-membership check.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use database::Gateway;
pub use middleware::MembershipGate;
pub use state::StateStore;
pub use utils::errors::{GatewayError, Result, SocietyBotError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
