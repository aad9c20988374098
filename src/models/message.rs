//! User message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A message sent to the administrators through the contact flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserMessage {
    pub id: i64,
    pub user_id: i64,
    pub user_full_name: String,
    pub message_text: String,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
    pub admin_reply: Option<String>,
    pub reply_date: Option<DateTime<Utc>>,
    pub replied_by: Option<i64>,
    pub message_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
    Replied,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
            MessageStatus::Replied => "replied",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "unread" => Some(MessageStatus::Unread),
            "read" => Some(MessageStatus::Read),
            "replied" => Some(MessageStatus::Replied),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
