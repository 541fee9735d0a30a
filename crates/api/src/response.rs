//! Success envelopes.
//!
//! Handlers wrap payloads as `{ "success": true, "data": ... }`, or
//! `{ "success": true, "message": ... }` for deletions.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// `200 OK` with `data`.
pub const fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data: Some(data),
        message: None,
    })
}

/// `201 Created` with `data`.
pub const fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// `200 OK` with a confirmation message and no data.
pub const fn message(text: &'static str) -> Json<Envelope<()>> {
    Json(Envelope {
        success: true,
        data: None,
        message: Some(text),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope() {
        let Json(body) = ok(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({ "success": true, "data": [1, 2] })
        );
    }

    #[test]
    fn test_message_envelope() {
        let Json(body) = message("Review deleted successfully");
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({ "success": true, "message": "Review deleted successfully" })
        );
    }
}
