//! Error types for the API client
//!
//! Every failed call resolves to exactly one [`ApiError`] variant, so callers
//! can match on the shape of the failure instead of probing fields:
//!
//! | Condition | Variant | `status()` |
//! |---|---|---|
//! | deadline exceeded | [`ApiError::Timeout`] | 408 |
//! | 422 with an `errors` map | [`ApiError::Validation`] | 422 |
//! | any other non-2xx | [`ApiError::Api`] | actual |
//! | transport failure | [`ApiError::Network`] | none |

use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Synthetic status carried by client-side timeouts
pub const TIMEOUT_STATUS: u16 = 408;

/// The only status treated as a field validation failure
pub const VALIDATION_STATUS: u16 = 422;

/// Last-resort message when neither the body nor the status explain the failure
pub const FALLBACK_MESSAGE: &str = "API request failed";

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// The transport failed before any HTTP response existed
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("Request timeout: the server took longer than {}s to respond", .after.as_secs_f32())]
    Timeout {
        /// Configured timeout that elapsed
        after: Duration,
    },

    /// The server rejected one or more submitted fields (HTTP 422)
    #[error("{message}")]
    Validation {
        /// All field messages joined with `", "`
        message: String,
        /// Raw per-field map as sent by the server
        errors: Map<String, Value>,
    },

    /// Any other non-2xx response
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Best-effort message extracted from the response
        message: String,
        /// Parsed response body, kept for diagnostics
        body: Value,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session token cannot be sent as an HTTP header value
    #[error("Invalid bearer token: contains characters not allowed in an HTTP header")]
    InvalidToken,
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a non-2xx response from its status, reason phrase and raw body.
    ///
    /// `reason` is the phrase the server sent on the status line; without one
    /// the canonical phrase for `status` is used. An unparseable body is
    /// replaced by `{"message": <status text>}`.
    #[must_use]
    pub fn from_response(status: StatusCode, reason: Option<&str>, body: &[u8]) -> Self {
        let status_text = reason
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .or_else(|| status.canonical_reason())
            .filter(|text| !text.is_empty());
        let parsed = serde_json::from_slice::<Value>(body).unwrap_or_else(|_| fallback_body(status_text));

        if status.as_u16() == VALIDATION_STATUS {
            if let Some(Value::Object(errors)) = parsed.get("errors") {
                return Self::Validation {
                    message: flatten_field_errors(errors),
                    errors: errors.clone(),
                };
            }
        }

        let message = non_empty_str(&parsed, "message")
            .or_else(|| non_empty_str(&parsed, "error"))
            .or(status_text)
            .unwrap_or(FALLBACK_MESSAGE)
            .to_string();

        Self::Api {
            status: status.as_u16(),
            message,
            body: parsed,
        }
    }

    /// HTTP-like status carried by this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Timeout { .. } => Some(TIMEOUT_STATUS),
            Self::Validation { .. } => Some(VALIDATION_STATUS),
            Self::Api { status, .. } => Some(*status),
            Self::Network(_) | Self::Json(_) | Self::Config(_) | Self::InvalidToken => None,
        }
    }

    /// Check if this error is a client-side timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if the server could not be reached at all
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Raw per-field validation map, for 422 responses
    #[must_use]
    pub fn validation_errors(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Messages reported for one field, in server order
    #[must_use]
    pub fn field_errors(&self, field: &str) -> Vec<String> {
        self.validation_errors()
            .and_then(|errors| errors.get(field))
            .map(field_messages)
            .unwrap_or_default()
    }

    /// Parsed body of a generic API error
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|status| (400..500).contains(&status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|status| status >= 500)
    }
}

fn fallback_body(status_text: Option<&str>) -> Value {
    match status_text {
        Some(text) => serde_json::json!({ "message": text }),
        None => Value::Object(Map::new()),
    }
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// One field's messages. Strings stand alone, arrays keep their order, nulls
/// contribute nothing and any other value is rendered as JSON text.
fn field_messages(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(field_messages).collect(),
        Value::String(text) => vec![text.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Flatten a field map into one message, fields in key order.
fn flatten_field_errors(errors: &Map<String, Value>) -> String {
    errors
        .values()
        .flat_map(field_messages)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn test_validation_flattening_preserves_order() {
        let payload = json!({
            "message": "Validation failed",
            "errors": {
                "email": ["required"],
                "password": ["required", "too short"]
            }
        });

        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, None, &body(&payload));

        assert_eq!(err.to_string(), "required, required, too short");
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.field_errors("password"), vec!["required", "too short"]);
        assert!(err.field_errors("name").is_empty());
    }

    #[test]
    fn test_validation_keeps_server_key_order() {
        let raw = br#"{"errors":{"zeta":"last alphabetically","alpha":["first alphabetically"]}}"#;
        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, None, raw);

        assert_eq!(err.to_string(), "last alphabetically, first alphabetically");
        let keys: Vec<_> = err.validation_errors().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_validation_mixed_values() {
        let payload = json!({ "errors": { "age": [18, null], "name": null } });
        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, None, &body(&payload));
        assert_eq!(err.to_string(), "18");
    }

    #[test]
    fn test_422_without_errors_map_is_generic() {
        let payload = json!({ "message": "Unprocessable", "errors": ["not", "a", "map"] });
        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, None, &body(&payload));

        assert!(matches!(err, ApiError::Api { status: 422, .. }));
        assert_eq!(err.to_string(), "Unprocessable");
    }

    #[test]
    fn test_errors_map_under_other_status_is_generic() {
        let payload = json!({ "errors": { "email": ["taken"] } });
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, None, &body(&payload));

        assert!(err.validation_errors().is_none());
        assert_eq!(err.to_string(), "Bad Request");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_generic_fallback_to_status_text() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, None, b"{}");
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.status(), Some(401));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_generic_prefers_message_then_error() {
        let err = ApiError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            &body(&json!({ "message": "boom", "error": "bad thing" })),
        );
        assert_eq!(err.to_string(), "boom");
        assert!(err.is_server_error());

        let err = ApiError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            &body(&json!({ "message": "", "error": "bad thing" })),
        );
        assert_eq!(err.to_string(), "bad thing");
        assert_eq!(err.body().unwrap()["error"], "bad thing");
    }

    #[test]
    fn test_unparseable_body_uses_status_text() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, None, b"<html>upstream down</html>");
        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.body().unwrap(), &json!({ "message": "Bad Gateway" }));
    }

    #[test]
    fn test_server_reason_phrase_wins_over_canonical() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, Some("Token Expired"), b"{}");
        assert_eq!(err.to_string(), "Token Expired");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_non_standard_status_uses_server_reason() {
        let status = StatusCode::from_u16(419).unwrap();
        let err = ApiError::from_response(status, Some("Page Expired"), b"not json");
        assert_eq!(err.to_string(), "Page Expired");
        assert_eq!(err.body().unwrap(), &json!({ "message": "Page Expired" }));
    }

    #[test]
    fn test_blank_reason_falls_back_to_canonical() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, Some("  "), b"{}");
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn test_unknown_status_uses_fallback_message() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = ApiError::from_response(status, None, b"");
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
        assert_eq!(err.status(), Some(599));
    }

    #[test]
    fn test_timeout_error() {
        let err = ApiError::Timeout {
            after: Duration::from_secs(30),
        };
        assert!(err.is_timeout());
        assert_eq!(err.status(), Some(TIMEOUT_STATUS));
        assert!(err.to_string().contains("took longer than 30s"));
    }
}
