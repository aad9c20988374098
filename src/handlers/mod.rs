//! Update handlers
//!
//! Commands, callback queries and plain messages all route through here;
//! the conversation flows themselves are driven from `flows`.

pub mod callbacks;
pub mod commands;
pub mod flows;
pub mod messages;

pub use callbacks::handle_callback_query;
pub use messages::handle_message;
