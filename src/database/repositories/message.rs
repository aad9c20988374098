//! User message repository implementation

use chrono::{DateTime, Utc};
use sqlx::Sqlite;

use crate::database::connection::DatabasePool;
use crate::models::{MessageStatus, UserMessage};

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: DatabasePool,
}

impl MessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Number of messages the user has sent since the given instant
    /// (the start of the current calendar day, in practice).
    pub async fn count_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_messages WHERE user_id = ?1 AND created_at >= ?2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserMessage>, sqlx::Error> {
        sqlx::query_as::<Sqlite, UserMessage>(
            "SELECT id, user_id, user_full_name, message_text, created_at, status, admin_reply, reply_date, replied_by, message_type FROM user_messages WHERE id = ?1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Messages ordered newest first with an optional status filter.
    pub async fn list(
        &self,
        status: Option<MessageStatus>,
        limit: i64,
    ) -> Result<Vec<UserMessage>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<Sqlite, UserMessage>(
                    "SELECT id, user_id, user_full_name, message_text, created_at, status, admin_reply, reply_date, replied_by, message_type FROM user_messages WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2"
                )
                .bind(status)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<Sqlite, UserMessage>(
                    "SELECT id, user_id, user_full_name, message_text, created_at, status, admin_reply, reply_date, replied_by, message_type FROM user_messages ORDER BY created_at DESC LIMIT ?1"
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// The id of the next message after `current_id`, optionally only
    /// considering messages with the given status.
    pub async fn next_id(
        &self,
        current_id: i64,
        status: Option<MessageStatus>,
    ) -> Result<Option<i64>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_scalar(
                    "SELECT id FROM user_messages WHERE id > ?1 AND status = ?2 ORDER BY id ASC LIMIT 1",
                )
                .bind(current_id)
                .bind(status)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar(
                    "SELECT id FROM user_messages WHERE id > ?1 ORDER BY id ASC LIMIT 1",
                )
                .bind(current_id)
                .fetch_optional(&self.pool)
                .await
            }
        }
    }

    /// The id of the message preceding `current_id`, with the same
    /// optional status filter.
    pub async fn previous_id(
        &self,
        current_id: i64,
        status: Option<MessageStatus>,
    ) -> Result<Option<i64>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_scalar(
                    "SELECT id FROM user_messages WHERE id < ?1 AND status = ?2 ORDER BY id DESC LIMIT 1",
                )
                .bind(current_id)
                .bind(status)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar(
                    "SELECT id FROM user_messages WHERE id < ?1 ORDER BY id DESC LIMIT 1",
                )
                .bind(current_id)
                .fetch_optional(&self.pool)
                .await
            }
        }
    }

    pub async fn unread_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_messages WHERE status = 'unread'")
            .fetch_one(&self.pool)
            .await
    }
}
