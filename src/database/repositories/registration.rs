//! Registration repository implementation

use sqlx::Sqlite;

use crate::database::connection::DatabasePool;
use crate::models::{Registration, RegistrationDetails};

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: DatabasePool,
}

impl RegistrationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Check whether the user already holds a registration for the event.
    pub async fn is_registered(&self, user_id: i64, event_name: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE user_id = ?1 AND event_name = ?2",
        )
        .bind(user_id)
        .bind(event_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// The user's registrations with the event display fields joined in,
    /// newest first. Event fields fall back to empty strings when the
    /// referenced event no longer exists.
    pub async fn list_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<RegistrationDetails>, sqlx::Error> {
        sqlx::query_as::<Sqlite, RegistrationDetails>(
            r#"
            SELECT r.id, r.user_id, r.full_name, r.student_id, r.national_id, r.phone_number,
                   r.event_name, r.registered_at,
                   COALESCE(e.date, '') AS event_date,
                   COALESCE(e.description, '') AS event_description,
                   COALESCE(e.time, '') AS event_time,
                   COALESCE(e.location, '') AS event_location
            FROM registrations r
            LEFT JOIN events e ON e.name = r.event_name
            WHERE r.user_id = ?1
            ORDER BY r.registered_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// A single registration owned by the user, with event fields joined.
    pub async fn details_by_id(
        &self,
        registration_id: i64,
        user_id: i64,
    ) -> Result<Option<RegistrationDetails>, sqlx::Error> {
        sqlx::query_as::<Sqlite, RegistrationDetails>(
            r#"
            SELECT r.id, r.user_id, r.full_name, r.student_id, r.national_id, r.phone_number,
                   r.event_name, r.registered_at,
                   COALESCE(e.date, '') AS event_date,
                   COALESCE(e.description, '') AS event_description,
                   COALESCE(e.time, '') AS event_time,
                   COALESCE(e.location, '') AS event_location
            FROM registrations r
            LEFT JOIN events e ON e.name = r.event_name
            WHERE r.id = ?1 AND r.user_id = ?2
            "#,
        )
        .bind(registration_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Most recent registrations across all users, for the admin surface.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Registration>, sqlx::Error> {
        sqlx::query_as::<Sqlite, Registration>(
            "SELECT id, user_id, full_name, student_id, national_id, phone_number, event_name, registered_at, status, notified_admin FROM registrations ORDER BY registered_at DESC LIMIT ?1"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_for_event(&self, event_name: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_name = ?1")
            .bind(event_name)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await
    }
}
