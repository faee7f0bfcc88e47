//! Application error type mapping to HTTP status codes and the widget's
//! error body `{"error": <message>, "kind": <kind>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use parley_types::error::{ChatError, ProviderError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Any failure reported by the chat pipeline.
    Chat(ChatError),
    /// Request used a method other than GET, POST or OPTIONS.
    MethodNotAllowed,
    /// Unexpected failure outside the chat pipeline.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    /// Status, kind and caller-safe message.
    ///
    /// Storage and internal detail is logged here and replaced by a generic
    /// message in the body.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(err @ ChatError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, err.kind(), err.to_string())
            }
            AppError::Chat(err @ ChatError::Auth(_)) => {
                (StatusCode::UNAUTHORIZED, err.kind(), err.to_string())
            }
            AppError::Chat(err @ ChatError::Provider(ProviderError::Auth { .. })) => {
                (StatusCode::UNAUTHORIZED, err.kind(), err.to_string())
            }
            AppError::Chat(err @ ChatError::Provider(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.kind(), err.to_string())
            }
            AppError::Chat(err @ ChatError::Storage(cause)) => {
                tracing::error!(error = %cause, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err.kind(),
                    "Internal server error".to_string(),
                )
            }
            AppError::Chat(err @ ChatError::Config(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.kind(), err.to_string())
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method",
                "Method not allowed".to_string(),
            ),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        }
    }

    /// The JSON error body, without the status.
    pub fn body(&self) -> Value {
        let (_, kind, message) = self.parts();
        json!({ "error": message, "kind": kind })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();
        (status, axum::Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::error::RepositoryError;

    fn status_of(err: AppError) -> StatusCode {
        err.parts().0
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ChatError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ChatError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (
                ChatError::Provider(ProviderError::Auth { message: "x".into() }),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ChatError::Provider(ProviderError::Http {
                    status: 503,
                    message: "x".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ChatError::Storage(RepositoryError::Connection),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ChatError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(status_of(AppError::from(err)), expected);
        }
        assert_eq!(status_of(AppError::MethodNotAllowed), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_storage_detail_is_hidden() {
        let err = AppError::from(ChatError::Storage(RepositoryError::Query(
            "no such table: chat_messages".into(),
        )));
        assert_eq!(
            err.body(),
            json!({ "error": "Internal server error", "kind": "storage" })
        );
    }

    #[test]
    fn test_provider_message_is_surfaced() {
        let err = AppError::from(ChatError::from(ProviderError::Auth {
            message: "bad key".into(),
        }));
        assert_eq!(
            err.body(),
            json!({ "error": "AI service error: Invalid API key: bad key", "kind": "auth" })
        );
    }
}
