//! Repository layer
//!
//! One repository per entity; read queries and simple lookups live here,
//! while every multi-statement transaction belongs to the gateway.

pub mod event;
pub mod message;
pub mod registration;

pub use event::EventRepository;
pub use message::MessageRepository;
pub use registration::RegistrationRepository;
