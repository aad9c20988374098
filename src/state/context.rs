//! Conversation context
//!
//! One context per user holds the typed flow state of their in-progress
//! conversation plus the bookkeeping the store needs for idle expiry.
//! Nothing in here is committed; the persistence gateway only sees a
//! record once the user confirms.

use chrono::{DateTime, Duration, Utc};

use crate::state::machine::Flow;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    /// User this context belongs to
    pub user_id: i64,
    /// Current flow and step, with any accumulated draft input
    pub flow: Flow,
    /// When the flow was started
    pub started_at: DateTime<Utc>,
    /// Last transition time, used for idle expiry
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(user_id: i64, flow: Flow) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            flow,
            started_at: now,
            updated_at: now,
        }
    }

    /// Replace the flow state and refresh the idle clock.
    pub fn advance(&mut self, flow: Flow) {
        self.flow = flow;
        self.updated_at = Utc::now();
    }

    /// Whether the context has sat untouched longer than the given TTL.
    pub fn is_idle_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.updated_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::machine::Flow;

    #[test]
    fn test_new_context_is_fresh() {
        let context = ConversationContext::new(123, Flow::new_registration());
        assert_eq!(context.user_id, 123);
        assert!(!context.is_idle_expired(Duration::hours(24), Utc::now()));
    }

    #[test]
    fn test_idle_expiry() {
        let context = ConversationContext::new(123, Flow::new_contact());
        let later = Utc::now() + Duration::hours(25);
        assert!(context.is_idle_expired(Duration::hours(24), later));
        assert!(!context.is_idle_expired(Duration::hours(48), later));
    }
}
