//! Data models

pub mod event;
pub mod message;
pub mod registration;

pub use event::{Event, EventCategory, EventUpdate, NewEvent};
pub use message::{MessageStatus, UserMessage};
pub use registration::{Applicant, Registration, RegistrationDetails};
