//! Database module

pub mod connection;
pub mod repositories;
pub mod seed;
pub mod service;

pub use connection::DatabasePool;
pub use service::{Gateway, SystemStats};
