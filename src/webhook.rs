//! Webhook endpoint — decodes Telegram update payloads and acknowledges
//! immediately; actual dispatch runs on a spawned task.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::dispatch::{DispatchRouter, IncomingEvent};
use crate::error::DispatchError;
use crate::survey::UserKey;

/// Fixed acknowledgment body returned for every delivery.
const ACK: &str = "ok";

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<DispatchRouter>,
}

/// Build the Axum router exposing the webhook and liveness endpoints.
pub fn webhook_routes(router: Arc<DispatchRouter>) -> Router {
    Router::new()
        .route("/webhook", post(receive_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { router })
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "intake-bot"
    }))
}

/// POST /webhook
///
/// Always acknowledges with `ok`: undecodable payloads are dropped (the
/// upstream transport must not retry them forever), and decodable events
/// are dispatched without blocking the response.
async fn receive_update(State(state): State<AppState>, body: String) -> &'static str {
    let event = match decode_event(&body) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "Dropping undecodable webhook payload");
            return ACK;
        }
    };

    let router = Arc::clone(&state.router);
    tokio::spawn(async move {
        if let Err(e) = router.handle_incoming(event).await {
            warn!(error = %e, "Dispatch failed");
        }
    });

    ACK
}

// ── Update decoding ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Update {
    message: Option<UpdateMessage>,
}

#[derive(Debug, Deserialize)]
struct UpdateMessage {
    message_id: i64,
    text: Option<String>,
    from: Option<Sender>,
    chat: ChatRef,
}

#[derive(Debug, Deserialize)]
struct Sender {
    id: i64,
    first_name: String,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatRef {
    id: i64,
}

/// Decode a raw transport payload into an [`IncomingEvent`].
///
/// Updates without a text message (photos, stickers, channel posts) are
/// rejected the same way as unparseable bodies: dropped with no side
/// effects.
pub fn decode_event(body: &str) -> Result<IncomingEvent, DispatchError> {
    let update: Update = serde_json::from_str(body)
        .map_err(|e| DispatchError::MalformedPayload(e.to_string()))?;

    let message = update
        .message
        .ok_or_else(|| DispatchError::MalformedPayload("update carries no message".into()))?;
    let text = message
        .text
        .ok_or_else(|| DispatchError::MalformedPayload("message carries no text".into()))?;
    let sender = message
        .from
        .ok_or_else(|| DispatchError::MalformedPayload("message carries no sender".into()))?;

    let full_name = match sender.last_name {
        Some(last) => format!("{} {last}", sender.first_name),
        None => sender.first_name,
    };

    Ok(IncomingEvent {
        user: UserKey {
            user_id: sender.id,
            chat_id: message.chat.id,
        },
        is_start: is_start_command(&text),
        text,
        message_id: message.message_id,
        full_name,
    })
}

/// Whether a message text is the start trigger.
///
/// Matches `/start`, `/start@botname`, and `/start <payload>` the way bot
/// command filters do.
fn is_start_command(text: &str) -> bool {
    let first = text.trim_start().split_whitespace().next().unwrap_or("");
    let command = first.split('@').next().unwrap_or("");
    command == "/start"
}
