//! Contact form message.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::MessageId;

/// A message submitted through the contact form.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A validated contact form submission.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub name: String,
    pub email: bazaar_core::Email,
    pub phone: String,
    pub subject: String,
    pub message: String,
}
