//! Event repository implementation

use sqlx::Sqlite;

use crate::database::connection::DatabasePool;
use crate::models::{Event, EventCategory};

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: DatabasePool,
}

impl EventRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Find an event by its business key.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<Sqlite, Event>(
            "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events WHERE name = ?1"
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<Sqlite, Event>(
            "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events WHERE id = ?1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List active events ordered by date ascending, optionally filtered
    /// by category.
    pub async fn list_active(
        &self,
        category: Option<EventCategory>,
    ) -> Result<Vec<Event>, sqlx::Error> {
        match category {
            Some(category) => {
                sqlx::query_as::<Sqlite, Event>(
                    "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events WHERE active = TRUE AND category = ?1 ORDER BY date ASC"
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<Sqlite, Event>(
                    "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events WHERE active = TRUE ORDER BY date ASC"
                )
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// List every event regardless of the active flag, for the admin view.
    pub async fn list_all(&self) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<Sqlite, Event>(
            "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events ORDER BY date ASC"
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
    }
}
