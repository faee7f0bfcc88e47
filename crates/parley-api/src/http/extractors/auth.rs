//! Host identity extractor.
//!
//! The widget runs inside a host application that has already logged the
//! user in. The host forwards who that is:
//! - `X-User-Id: <positive integer>`
//! - `X-Session-Id: <host session key>` (optional, defaults to `user-<id>`)
//! - `Authorization: Bearer <host token>` when a host token is configured
//!
//! Host tokens are SHA-256 hashed and compared against the configured digest.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use parley_types::error::ChatError;
use parley_types::request::Identity;

use crate::http::error::AppError;
use crate::state::{AppState, digest};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// The authenticated caller. Extracting this validates the host headers.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

fn unauthenticated() -> AppError {
    AppError::Chat(ChatError::Auth("Authentication required".to_string()))
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(expected) = &state.host_token_digest {
            let token = header(parts, "authorization")
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .ok_or_else(unauthenticated)?;
            if &digest(token) != expected {
                tracing::debug!("host token mismatch");
                return Err(unauthenticated());
            }
        }

        let user_id = header(parts, USER_ID_HEADER)
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(unauthenticated)?;

        let session_id = header(parts, SESSION_ID_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| format!("user-{user_id}"));

        Ok(Caller(Identity::new(user_id, session_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{FixedProvider, state_with};
    use axum::http::Request;

    async fn extract(state: &AppState, headers: &[(&str, &str)]) -> Result<Identity, AppError> {
        let mut builder = Request::builder().uri("/api/chat");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        Caller::from_request_parts(&mut parts, state)
            .await
            .map(|Caller(identity)| identity)
    }

    fn is_auth_error(result: Result<Identity, AppError>) -> bool {
        matches!(result, Err(AppError::Chat(ChatError::Auth(_))))
    }

    #[tokio::test]
    async fn test_user_and_session_headers() {
        let state = state_with(FixedProvider::replying("x")).await;
        let identity = extract(&state, &[("X-User-Id", "7"), ("X-Session-Id", "abc")])
            .await
            .unwrap();
        assert_eq!(identity, Identity::new(7, "abc"));
    }

    #[tokio::test]
    async fn test_session_defaults_to_user_key() {
        let state = state_with(FixedProvider::replying("x")).await;
        let identity = extract(&state, &[("X-User-Id", " 12 ")]).await.unwrap();
        assert_eq!(identity.session_id, "user-12");
    }

    #[tokio::test]
    async fn test_bad_user_ids_are_rejected() {
        let state = state_with(FixedProvider::replying("x")).await;
        assert!(is_auth_error(extract(&state, &[]).await));
        for bad in ["0", "-4", "abc", ""] {
            assert!(is_auth_error(extract(&state, &[("X-User-Id", bad)]).await), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_host_token_required_when_configured() {
        let state = state_with(FixedProvider::replying("x"))
            .await
            .with_host_token("s3cret");

        assert!(is_auth_error(extract(&state, &[("X-User-Id", "1")]).await));
        assert!(is_auth_error(
            extract(&state, &[("X-User-Id", "1"), ("Authorization", "Bearer wrong")]).await
        ));
        let identity = extract(
            &state,
            &[("X-User-Id", "1"), ("Authorization", "Bearer s3cret")],
        )
        .await
        .unwrap();
        assert_eq!(identity.user_id, 1);
    }
}
