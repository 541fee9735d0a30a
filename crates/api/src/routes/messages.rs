//! Contact message route handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{Email, MessageId};

use super::parse_id;
use crate::db::{MessageRepository, RepositoryError};
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::message::NewMessage;
use crate::response::{created, message, ok};
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Read-state form.
#[derive(Debug, Default, Deserialize)]
pub struct ReadForm {
    #[serde(default)]
    pub read: bool,
}

/// Validate a contact form submission.
fn new_message(form: ContactForm) -> Result<NewMessage> {
    let name = form.name.trim();
    let message = form.message.trim();
    if name.is_empty() || form.email.trim().is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email, and message are required".to_string(),
        ));
    }

    let email = Email::parse(&form.email)
        .map_err(|_| AppError::BadRequest("Invalid email address".to_string()))?;

    Ok(NewMessage {
        name: name.to_owned(),
        email,
        phone: form.phone.unwrap_or_default().trim().to_owned(),
        subject: form.subject.unwrap_or_default().trim().to_owned(),
        message: message.to_owned(),
    })
}

fn not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Message not found".to_string()),
        other => AppError::Database(other),
    }
}

/// Submit the contact form.
///
/// POST /api/messages
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Result<impl IntoResponse> {
    let new = new_message(form)?;
    let saved = MessageRepository::new(state.pool()).create(&new).await?;

    tracing::info!(message_id = %saved.id, email_domain = %new.email.domain(), "Contact message received");
    Ok(created(saved))
}

/// Every message, newest first.
///
/// GET /api/messages/admin/all
pub async fn admin_index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let messages = MessageRepository::new(state.pool()).list_all().await?;
    Ok(ok(messages))
}

/// Mark a message read or unread.
///
/// PUT /api/messages/{id}/read
pub async fn mark_read(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(form): ApiJson<ReadForm>,
) -> Result<impl IntoResponse> {
    let id: MessageId = parse_id(&id, "message")?;
    let updated = MessageRepository::new(state.pool())
        .set_read(id, form.read)
        .await
        .map_err(not_found)?;
    Ok(ok(updated))
}

/// Delete a message.
///
/// DELETE /api/messages/{id}
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn delete(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: MessageId = parse_id(&id, "message")?;
    MessageRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found)?;

    tracing::info!(message_id = %id, "Message deleted");
    Ok(message("Message deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            ..ContactForm::default()
        }
    }

    #[test]
    fn test_valid_message_defaults_optional_fields() {
        let msg = new_message(form(" Ada ", "ada@example.com", "Hello")).unwrap();
        assert_eq!(msg.name, "Ada");
        assert!(msg.phone.is_empty());
        assert!(msg.subject.is_empty());
    }

    #[test]
    fn test_required_fields() {
        let err = new_message(form("Ada", "", "Hello")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Name, email, and message are required"
        );
        assert!(new_message(form("", "ada@example.com", "Hello")).is_err());
        assert!(new_message(form("Ada", "ada@example.com", "   ")).is_err());
    }

    #[test]
    fn test_invalid_email() {
        let err = new_message(form("Ada", "not-an-email", "Hello")).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid email address");
    }
}
