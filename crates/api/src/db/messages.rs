//! Contact message repository.

use sqlx::PgPool;

use bazaar_core::MessageId;

use super::RepositoryError;
use crate::models::ContactMessage;
use crate::models::message::NewMessage;

const MESSAGE_COLUMNS: &str = "id, name, email, phone, subject, message, read, read_at, created_at";

/// Repository for the contact form inbox.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store an unread message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, message: &NewMessage) -> Result<ContactMessage, RepositoryError> {
        let created = sqlx::query_as::<_, ContactMessage>(&format!(
            r"
            INSERT INTO shop.contact_message (name, email, phone, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "
        ))
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.phone)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// Every message, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let messages = sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM shop.contact_message ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(messages)
    }

    /// Mark a message read or unread.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_read(&self, id: MessageId, read: bool) -> Result<ContactMessage, RepositoryError> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            r"
            UPDATE shop.contact_message
            SET read = $2, read_at = now()
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(read)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.contact_message WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
