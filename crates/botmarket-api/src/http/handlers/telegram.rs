//! Telegram webhook handler.

use axum::Json;
use axum::extract::State;

use botmarket_types::telegram::TelegramUpdate;

use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/telegram - Webhook entry point.
///
/// Returns 200 as soon as the update parses; the relay replies to the user
/// in-band over the chat transport. The work runs on a detached task so a
/// dropped webhook connection cannot cancel it mid-flight -- the session
/// mutex cleanup in the relay must always run.
pub async fn webhook(
    State(state): State<AppState>,
    Json(update): Json<TelegramUpdate>,
) -> Json<ApiResponse<serde_json::Value>> {
    let relay = state.relay.clone();
    tokio::spawn(async move {
        if let Err(err) = relay.handle_update(&update).await {
            tracing::error!(%err, "relay reply delivery failed");
        }
    });

    Json(ApiResponse::success(
        serde_json::json!({ "accepted": true }),
        uuid::Uuid::new_v4().to_string(),
        0,
    ))
}
