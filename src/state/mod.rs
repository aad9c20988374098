//! Conversation state management

pub mod context;
pub mod machine;
pub mod store;

pub use context::ConversationContext;
pub use machine::{Effect, Field, Flow, FlowInput, ProfileStep, RegistrationDraft, RegistrationStep, Transition};
pub use store::StateStore;
