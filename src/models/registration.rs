//! Registration model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A confirmed binding of one user to one event. At most one row exists
/// per (user_id, event_name).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub student_id: String,
    pub national_id: String,
    pub phone_number: String,
    pub event_name: String,
    pub registered_at: DateTime<Utc>,
    pub status: String,
    pub notified_admin: bool,
}

/// The personal fields collected by the registration conversation,
/// already validated and digit-normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub full_name: String,
    pub student_id: String,
    pub national_id: String,
    pub phone_number: String,
}

/// A registration joined with its event's display fields, as shown in
/// the profile and cancellation views. Event fields default to empty
/// strings when the referenced event is gone.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationDetails {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub student_id: String,
    pub national_id: String,
    pub phone_number: String,
    pub event_name: String,
    pub registered_at: DateTime<Utc>,
    pub event_date: String,
    pub event_description: String,
    pub event_time: String,
    pub event_location: String,
}
