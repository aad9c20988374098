//! Persistence gateway
//!
//! The only component allowed to mutate stored entities. Every mutating
//! operation runs as a single transaction and returns a value from the
//! closed [`GatewayError`] set; read-only queries never surface storage
//! failures and degrade to empty/zero defaults instead, so the
//! presentation layer stays stable.

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::Sqlite;
use tracing::{error, info};

use crate::database::connection::DatabasePool;
use crate::database::repositories::{EventRepository, MessageRepository, RegistrationRepository};
use crate::models::{
    Applicant, Event, EventCategory, EventUpdate, MessageStatus, NewEvent, Registration,
    RegistrationDetails, UserMessage,
};
use crate::utils::errors::{GatewayError, GatewayResult};

/// Aggregate counters for the admin stats view.
#[derive(Debug, Clone, Default)]
pub struct SystemStats {
    pub events: i64,
    pub registrations: i64,
    pub unread_messages: i64,
}

#[derive(Debug, Clone)]
pub struct Gateway {
    pool: DatabasePool,
    events: EventRepository,
    registrations: RegistrationRepository,
    messages: MessageRepository,
    max_messages_per_day: i64,
}

impl Gateway {
    pub fn new(pool: DatabasePool, max_messages_per_day: i64) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            pool,
            max_messages_per_day,
        }
    }

    // ---- registration ----------------------------------------------------

    /// Register a user for an active event.
    ///
    /// The existence check, the duplicate check, the capacity check and
    /// both mutations happen inside one transaction. Capacity is taken
    /// with a conditional `UPDATE ... WHERE registered_count < capacity`,
    /// so two concurrent registrations can never both pass a stale check;
    /// the unique (user_id, event_name) index backstops the duplicate
    /// check the same way.
    pub async fn register(
        &self,
        user_id: i64,
        event_name: &str,
        applicant: &Applicant,
    ) -> GatewayResult<i64> {
        let result = self.register_tx(user_id, event_name, applicant).await;
        match &result {
            Ok(id) => {
                info!(user_id, event = %event_name, registration_id = id, "Registration added");
            }
            Err(err) if err.is_transient() => {
                error!(user_id, event = %event_name, error = ?err, "Registration failed on storage");
            }
            Err(_) => {}
        }
        result
    }

    async fn register_tx(
        &self,
        user_id: i64,
        event_name: &str,
        applicant: &Applicant,
    ) -> GatewayResult<i64> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<Sqlite, Event>(
            "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events WHERE name = ?1 AND active = TRUE"
        )
        .bind(event_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| GatewayError::EventNotFound {
            name: event_name.to_string(),
        })?;

        let duplicates: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE user_id = ?1 AND event_name = ?2",
        )
        .bind(user_id)
        .bind(event_name)
        .fetch_one(&mut *tx)
        .await?;
        if duplicates > 0 {
            return Err(GatewayError::DuplicateRegistration {
                user_id,
                name: event_name.to_string(),
            });
        }

        let taken = sqlx::query(
            "UPDATE events SET registered_count = registered_count + 1 WHERE id = ?1 AND registered_count < capacity"
        )
        .bind(event.id)
        .execute(&mut *tx)
        .await?;
        if taken.rows_affected() == 0 {
            return Err(GatewayError::CapacityExceeded {
                name: event_name.to_string(),
            });
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO registrations (user_id, full_name, student_id, national_id, phone_number, event_name, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(user_id)
        .bind(&applicant.full_name)
        .bind(&applicant.student_id)
        .bind(&applicant.national_id)
        .bind(&applicant.phone_number)
        .bind(event_name)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted.last_insert_rowid())
    }

    /// Delete the user's registration and release its capacity slot in
    /// the same transaction. Only the owning user may cancel.
    pub async fn cancel_registration(
        &self,
        registration_id: i64,
        user_id: i64,
    ) -> GatewayResult<()> {
        let result = self.cancel_registration_tx(registration_id, user_id).await;
        match &result {
            Ok(()) => {
                info!(user_id, registration_id, "Registration cancelled");
            }
            Err(err) if err.is_transient() => {
                error!(user_id, registration_id, error = ?err, "Cancellation failed on storage");
            }
            Err(_) => {}
        }
        result
    }

    async fn cancel_registration_tx(
        &self,
        registration_id: i64,
        user_id: i64,
    ) -> GatewayResult<()> {
        let mut tx = self.pool.begin().await?;

        let registration = sqlx::query_as::<Sqlite, Registration>(
            "SELECT id, user_id, full_name, student_id, national_id, phone_number, event_name, registered_at, status, notified_admin FROM registrations WHERE id = ?1 AND user_id = ?2"
        )
        .bind(registration_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GatewayError::RegistrationNotFound {
            id: registration_id,
        })?;

        sqlx::query("DELETE FROM registrations WHERE id = ?1")
            .bind(registration_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE events SET registered_count = MAX(registered_count - 1, 0) WHERE name = ?1",
        )
        .bind(&registration.event_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    // ---- contact messages ------------------------------------------------

    /// Store a contact message, enforcing the per-day quota inside the
    /// insert transaction.
    pub async fn add_message(
        &self,
        user_id: i64,
        display_name: &str,
        text: &str,
    ) -> GatewayResult<i64> {
        self.add_message_at(user_id, display_name, text, Utc::now())
            .await
    }

    /// Quota counting is anchored to the calendar day of `now`; the clock
    /// is a parameter so the day boundary is testable.
    pub async fn add_message_at(
        &self,
        user_id: i64,
        display_name: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> GatewayResult<i64> {
        let result = self
            .add_message_tx(user_id, display_name, text, now)
            .await;
        match &result {
            Ok(id) => {
                info!(user_id, message_id = id, "User message added");
            }
            Err(err) if err.is_transient() => {
                error!(user_id, error = ?err, "Storing user message failed");
            }
            Err(_) => {}
        }
        result
    }

    async fn add_message_tx(
        &self,
        user_id: i64,
        display_name: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> GatewayResult<i64> {
        let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let mut tx = self.pool.begin().await?;

        let sent_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_messages WHERE user_id = ?1 AND created_at >= ?2",
        )
        .bind(user_id)
        .bind(day_start)
        .fetch_one(&mut *tx)
        .await?;
        if sent_today >= self.max_messages_per_day {
            return Err(GatewayError::DailyQuotaExceeded { user_id });
        }

        let inserted = sqlx::query(
            "INSERT INTO user_messages (user_id, user_full_name, message_text, created_at) VALUES (?1, ?2, ?3, ?4)"
        )
        .bind(user_id)
        .bind(display_name)
        .bind(text)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted.last_insert_rowid())
    }

    // ---- event administration --------------------------------------------

    pub async fn create_event(&self, event: NewEvent) -> GatewayResult<Event> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE name = ?1")
            .bind(&event.name)
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Err(GatewayError::DuplicateEvent { name: event.name });
        }

        let created = sqlx::query_as::<Sqlite, Event>(
            r#"
            INSERT INTO events (name, description, date, time, location, capacity, category)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, name, description, date, time, location, capacity, registered_count, category, active
            "#,
        )
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(event.capacity)
        .bind(event.category)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(event = %created.name, event_id = created.id, "Event created");
        Ok(created)
    }

    /// Apply a partial update. Renames cascade to the registrations
    /// referencing the old name in the same transaction, so the name join
    /// key never dangles; capacity can never drop below the registered
    /// count.
    pub async fn update_event(&self, id: i64, update: EventUpdate) -> GatewayResult<Event> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<Sqlite, Event>(
            "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events WHERE id = ?1"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| GatewayError::EventNotFound {
            name: format!("#{id}"),
        })?;

        let name = update.name.unwrap_or_else(|| current.name.clone());
        if name != current.name {
            let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE name = ?1")
                .bind(&name)
                .fetch_one(&mut *tx)
                .await?;
            if taken > 0 {
                return Err(GatewayError::DuplicateEvent { name });
            }
        }

        let capacity = update.capacity.unwrap_or(current.capacity);
        if capacity < current.registered_count {
            return Err(GatewayError::CapacityBelowRegistered);
        }

        let updated = sqlx::query_as::<Sqlite, Event>(
            r#"
            UPDATE events
            SET name = ?2, description = ?3, date = ?4, time = ?5, location = ?6,
                capacity = ?7, category = ?8
            WHERE id = ?1
            RETURNING id, name, description, date, time, location, capacity, registered_count, category, active
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(update.description.unwrap_or_else(|| current.description.clone()))
        .bind(update.date.unwrap_or_else(|| current.date.clone()))
        .bind(update.time.unwrap_or_else(|| current.time.clone()))
        .bind(update.location.unwrap_or_else(|| current.location.clone()))
        .bind(capacity)
        .bind(update.category.unwrap_or(current.category))
        .fetch_one(&mut *tx)
        .await?;

        if name != current.name {
            sqlx::query("UPDATE registrations SET event_name = ?1 WHERE event_name = ?2")
                .bind(&name)
                .bind(&current.name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(event_id = id, "Event updated");
        Ok(updated)
    }

    /// Flip the active flag; returns the new state.
    pub async fn toggle_event(&self, id: i64) -> GatewayResult<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<Sqlite, Event>(
            r#"
            UPDATE events SET active = NOT active WHERE id = ?1
            RETURNING id, name, description, date, time, location, capacity, registered_count, category, active
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| GatewayError::EventNotFound {
            name: format!("#{id}"),
        })?;

        tx.commit().await?;
        info!(event_id = id, active = updated.active, "Event toggled");
        Ok(updated.active)
    }

    /// Delete an event; refused while any registration still references it.
    pub async fn delete_event(&self, id: i64) -> GatewayResult<()> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<Sqlite, Event>(
            "SELECT id, name, description, date, time, location, capacity, registered_count, category, active FROM events WHERE id = ?1"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| GatewayError::EventNotFound {
            name: format!("#{id}"),
        })?;

        let referenced: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_name = ?1")
                .bind(&event.name)
                .fetch_one(&mut *tx)
                .await?;
        if referenced > 0 {
            return Err(GatewayError::HasActiveRegistrations { id });
        }

        sqlx::query("DELETE FROM events WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(event_id = id, event = %event.name, "Event deleted");
        Ok(())
    }

    // ---- message administration ------------------------------------------

    pub async fn mark_message_read(&self, id: i64) -> GatewayResult<()> {
        let updated =
            sqlx::query("UPDATE user_messages SET status = 'read' WHERE id = ?1 AND status = 'unread'")
                .bind(id)
                .execute(&self.pool)
                .await?;
        if updated.rows_affected() == 0 {
            // Either missing or already past unread; distinguish for the caller.
            if self.messages.find_by_id(id).await?.is_none() {
                return Err(GatewayError::MessageNotFound { id });
            }
        }
        Ok(())
    }

    pub async fn add_admin_reply(
        &self,
        id: i64,
        admin_id: i64,
        reply_text: &str,
    ) -> GatewayResult<()> {
        let updated = sqlx::query(
            "UPDATE user_messages SET admin_reply = ?2, replied_by = ?3, reply_date = ?4, status = 'replied' WHERE id = ?1"
        )
        .bind(id)
        .bind(reply_text)
        .bind(admin_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(GatewayError::MessageNotFound { id });
        }
        info!(message_id = id, admin_id, "Admin reply recorded");
        Ok(())
    }

    pub async fn delete_message(&self, id: i64) -> GatewayResult<()> {
        let deleted = sqlx::query("DELETE FROM user_messages WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(GatewayError::MessageNotFound { id });
        }
        info!(message_id = id, "User message deleted");
        Ok(())
    }

    // ---- read-only queries (degrade, never fail) -------------------------

    pub async fn list_events(&self, category: Option<EventCategory>) -> Vec<Event> {
        self.events.list_active(category).await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to list events");
            Vec::new()
        })
    }

    pub async fn list_all_events(&self) -> Vec<Event> {
        self.events.list_all().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to list all events");
            Vec::new()
        })
    }

    pub async fn find_event(&self, name: &str) -> Option<Event> {
        self.events.find_by_name(name).await.unwrap_or_else(|e| {
            error!(error = %e, event = %name, "Failed to load event");
            None
        })
    }

    pub async fn is_registered(&self, user_id: i64, event_name: &str) -> bool {
        self.registrations
            .is_registered(user_id, event_name)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, user_id, event = %event_name, "Registration lookup failed");
                false
            })
    }

    pub async fn user_registrations(&self, user_id: i64) -> Vec<RegistrationDetails> {
        self.registrations
            .list_for_user(user_id)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, user_id, "Failed to load user registrations");
                Vec::new()
            })
    }

    pub async fn registration_details(
        &self,
        registration_id: i64,
        user_id: i64,
    ) -> Option<RegistrationDetails> {
        self.registrations
            .details_by_id(registration_id, user_id)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, registration_id, user_id, "Failed to load registration");
                None
            })
    }

    pub async fn messages_sent_today(&self, user_id: i64) -> i64 {
        let day_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        self.messages
            .count_since(user_id, day_start)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, user_id, "Failed to count today's messages");
                0
            })
    }

    pub fn daily_message_quota(&self) -> i64 {
        self.max_messages_per_day
    }

    pub async fn message_by_id(&self, id: i64) -> Option<UserMessage> {
        self.messages.find_by_id(id).await.unwrap_or_else(|e| {
            error!(error = %e, message_id = id, "Failed to load message");
            None
        })
    }

    pub async fn list_messages(
        &self,
        status: Option<MessageStatus>,
        limit: i64,
    ) -> Vec<UserMessage> {
        self.messages.list(status, limit).await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to list messages");
            Vec::new()
        })
    }

    pub async fn next_message_id(
        &self,
        current_id: i64,
        status: Option<MessageStatus>,
    ) -> Option<i64> {
        self.messages
            .next_id(current_id, status)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to find next message");
                None
            })
    }

    pub async fn previous_message_id(
        &self,
        current_id: i64,
        status: Option<MessageStatus>,
    ) -> Option<i64> {
        self.messages
            .previous_id(current_id, status)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to find previous message");
                None
            })
    }

    pub async fn unread_message_count(&self) -> i64 {
        self.messages.unread_count().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to count unread messages");
            0
        })
    }

    pub async fn recent_registrations(&self, limit: i64) -> Vec<Registration> {
        self.registrations.recent(limit).await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to load recent registrations");
            Vec::new()
        })
    }

    pub async fn system_stats(&self) -> SystemStats {
        SystemStats {
            events: self.events.count().await.unwrap_or_else(|e| {
                error!(error = %e, "Failed to count events");
                0
            }),
            registrations: self.registrations.count().await.unwrap_or_else(|e| {
                error!(error = %e, "Failed to count registrations");
                0
            }),
            unread_messages: self.unread_message_count().await,
        }
    }
}
