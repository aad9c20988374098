//! Event model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registerable activity with finite capacity.
///
/// `name` is the business key; registrations reference events by name.
/// The `registered_count` column is kept in sync with the registration
/// rows transactionally and never exceeds `capacity`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub capacity: i64,
    pub registered_count: i64,
    pub category: EventCategory,
    pub active: bool,
}

impl Event {
    /// Remaining capacity, floored at zero.
    pub fn remaining_capacity(&self) -> i64 {
        (self.capacity - self.registered_count).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.registered_count >= self.capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Event,
    Workshop,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Event => "event",
            EventCategory::Workshop => "workshop",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "event" => Some(EventCategory::Event),
            "workshop" => Some(EventCategory::Workshop),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields for creating a new event via the administrative surface.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub capacity: i64,
    pub category: EventCategory,
}

/// Partial update for an existing event; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i64>,
    pub category: Option<EventCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        assert_eq!(EventCategory::parse("workshop"), Some(EventCategory::Workshop));
        assert_eq!(EventCategory::parse(" event "), Some(EventCategory::Event));
        assert_eq!(EventCategory::parse("seminar"), None);
        assert_eq!(EventCategory::Workshop.as_str(), "workshop");
    }

    #[test]
    fn test_remaining_capacity() {
        let event = Event {
            id: 1,
            name: "x".to_string(),
            description: String::new(),
            date: String::new(),
            time: String::new(),
            location: String::new(),
            capacity: 10,
            registered_count: 10,
            category: EventCategory::Event,
            active: true,
        };
        assert_eq!(event.remaining_capacity(), 0);
        assert!(event.is_full());
    }
}
