//! The widget endpoint.
//!
//! `GET|POST /api/chat` decodes the payload into a typed request, resolves
//! the caller's session store and hands both to the core router.
//!
//! When a `send_message` request carries `Accept: text/event-stream`, the
//! response is streamed: raw provider chunks are forwarded as they arrive,
//! followed by one terminal event holding the normal JSON result:
//!
//! ```text
//! event: result
//! data: {"success":true,"message":"...","chat":{...}}
//! ```

use std::convert::Infallible;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use parley_infra::session::SessionConversationStore;
use parley_types::request::{ChatRequest, Identity};

use crate::http::error::AppError;
use crate::http::extractors::auth::Caller;
use crate::http::payload::RawPayload;
use crate::state::AppState;

/// Buffered chunks between the provider task and the response body.
const FORWARD_BUFFER: usize = 32;

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"))
}

/// GET|POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Caller(identity): Caller,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = if method == Method::GET {
        RawPayload::from_query(query.as_deref())?
    } else {
        RawPayload::from_body(&body)?
    };
    let request = payload.into_request(state.config.default_max_memory)?;
    let ephemeral = state.sessions.store(identity.session_id.clone());

    if matches!(request, ChatRequest::SendMessage(_)) && wants_event_stream(&headers) {
        return Ok(stream_send(state, identity, ephemeral, request));
    }

    let response = state
        .router
        .dispatch(&identity, &ephemeral, request, None)
        .await?;
    Ok(Json(response.into_json()).into_response())
}

/// Run the turn on its own task and stream its output.
///
/// Dropping the response body closes the channel, which aborts the provider
/// call with `Disconnected` before anything is persisted.
fn stream_send(
    state: AppState,
    identity: Identity,
    ephemeral: SessionConversationStore,
    request: ChatRequest,
) -> Response {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Vec<u8>>(FORWARD_BUFFER);

    let turn = tokio::spawn(async move {
        state
            .router
            .dispatch(&identity, &ephemeral, request, Some(&tx))
            .await
    });

    let body = async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            yield Ok::<_, Infallible>(Bytes::from(chunk));
        }

        let result: Value = match turn.await {
            Ok(Ok(response)) => response.into_json(),
            Ok(Err(err)) => AppError::from(err).body(),
            Err(join_err) => AppError::Internal(join_err.to_string()).body(),
        };
        yield Ok(Bytes::from(format!("\n\nevent: result\ndata: {result}\n\n")));
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

/// Any other method on /api/chat.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
