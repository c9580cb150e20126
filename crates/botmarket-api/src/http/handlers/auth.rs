//! Developer dashboard login.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/login - Verify credentials and return the developer scope.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let outcome = state.user_service.login(&body.email, &body.password).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::to_value(&outcome).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}
