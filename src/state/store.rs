//! Per-user conversation state store
//!
//! An injected, process-scoped map from user id to conversation context.
//! Lifecycle rules are enforced by this API rather than by handler
//! convention: starting a flow replaces whatever was left behind,
//! terminal transitions remove the entry, and entries idle longer than
//! the TTL are dropped on access so an abandoned flow never leaks into a
//! fresh one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use tracing::debug;

use crate::state::context::ConversationContext;
use crate::state::machine::Flow;

const DEFAULT_IDLE_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct StateStore {
    entries: Arc<Mutex<HashMap<i64, ConversationContext>>>,
    idle_ttl: Duration,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_idle_ttl(Duration::hours(DEFAULT_IDLE_TTL_HOURS))
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Begin a flow for the user, replacing any leftover state from an
    /// abandoned conversation.
    pub fn start(&self, user_id: i64, flow: Flow) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(&user_id).is_some() {
            debug!(user_id, "Replacing leftover conversation state");
        }
        entries.insert(user_id, ConversationContext::new(user_id, flow));
    }

    /// The user's current flow state, if any. Expired entries are
    /// removed here and reported as absent.
    pub fn current(&self, user_id: i64) -> Option<Flow> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&user_id) {
            Some(context) if context.is_idle_expired(self.idle_ttl, Utc::now()) => {
                debug!(user_id, "Dropping idle-expired conversation state");
                entries.remove(&user_id);
                None
            }
            Some(context) => Some(context.flow.clone()),
            None => None,
        }
    }

    /// Apply the outcome of a machine transition: `Some` keeps the
    /// conversation going with the new state, `None` is terminal and
    /// removes the entry.
    pub fn transition(&self, user_id: i64, next: Option<Flow>) {
        let mut entries = self.entries.lock().unwrap();
        match next {
            Some(flow) => match entries.get_mut(&user_id) {
                Some(context) => context.advance(flow),
                None => {
                    entries.insert(user_id, ConversationContext::new(user_id, flow));
                }
            },
            None => {
                entries.remove(&user_id);
            }
        }
    }

    /// Explicit cancel/reset; returns whether anything was discarded.
    pub fn clear(&self, user_id: i64) -> bool {
        self.entries.lock().unwrap().remove(&user_id).is_some()
    }

    /// Number of users with an in-progress conversation.
    pub fn active_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::machine::{Flow, RegistrationDraft, RegistrationStep};

    #[test]
    fn test_start_and_current() {
        let store = StateStore::new();
        assert_eq!(store.current(1), None);

        store.start(1, Flow::new_registration());
        assert_eq!(store.current(1), Some(Flow::new_registration()));
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn test_terminal_transition_clears() {
        let store = StateStore::new();
        store.start(1, Flow::new_contact());
        store.transition(1, None);
        assert_eq!(store.current(1), None);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_start_replaces_leftover_state() {
        let store = StateStore::new();
        store.start(1, Flow::Registration {
            step: RegistrationStep::EnteringPhone,
            draft: RegistrationDraft {
                event_name: Some("x".to_string()),
                full_name: Some("علی احمدی".to_string()),
                ..Default::default()
            },
        });

        // a fresh start must not inherit the abandoned draft
        store.start(1, Flow::new_registration());
        assert_eq!(store.current(1), Some(Flow::new_registration()));
    }

    #[test]
    fn test_clear() {
        let store = StateStore::new();
        store.start(1, Flow::new_profile());
        assert!(store.clear(1));
        assert!(!store.clear(1));
        assert_eq!(store.current(1), None);
    }

    #[test]
    fn test_idle_expiry_drops_entry() {
        let store = StateStore::with_idle_ttl(Duration::seconds(-1));
        store.start(1, Flow::new_contact());
        // TTL already elapsed, so the entry is gone on first access
        assert_eq!(store.current(1), None);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_users_are_isolated() {
        let store = StateStore::new();
        store.start(1, Flow::new_registration());
        store.start(2, Flow::new_contact());
        store.transition(1, None);
        assert_eq!(store.current(1), None);
        assert_eq!(store.current(2), Some(Flow::new_contact()));
    }
}
