//! Chatbot directory and mutation handlers for the REST API.

use std::collections::HashMap;
use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use botmarket_core::repository::FieldFilter;
use botmarket_core::service::chatbot::DirectoryQuery;
use botmarket_types::chatbot::{NewChatbot, UpdateChatbotRequest};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Treat `?developer_id=` the same as an absent parameter; the empty string
/// never matches a record and would otherwise mask the precedence rules.
fn non_empty(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}

/// GET /api/v1/chatbots - Directory listing with parameter precedence:
/// no parameters lists everything, then developer_id, then chatbot_id.
pub async fn get_chatbots(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = request_id();

    let query = DirectoryQuery {
        developer_id: non_empty(&params, "developer_id"),
        chatbot_id: non_empty(&params, "chatbot_id"),
        has_params: !params.is_empty(),
    };

    let chatbots = state.chatbot_service.get_chatbots(&query).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = chatbots
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(
        ApiResponse::success(data, request_id, elapsed).with_link("self", "/api/v1/chatbots"),
    ))
}

/// POST /api/v1/chatbots - Register a new chatbot.
pub async fn create_chatbot(
    State(state): State<AppState>,
    Json(body): Json<NewChatbot>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = request_id();

    let chatbot = state.chatbot_service.create(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::to_value(&chatbot).map_err(|e| AppError::Internal(e.to_string()))?;
    let resp = ApiResponse::success(data, request_id, elapsed).with_link(
        "self",
        &format!("/api/v1/chatbots?chatbot_id={}", chatbot.id),
    );

    Ok(Json(resp))
}

/// Structured search body: AND-combined field filters.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
}

/// POST /api/v1/chatbots/search - Structured field-filter search.
pub async fn search_chatbots(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = request_id();

    let chatbots = state.chatbot_service.search(&body.filters).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = chatbots
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}

/// Query parameter identifying the mutation target.
#[derive(Debug, Deserialize)]
pub struct ChatbotIdParam {
    pub chatbot_id: String,
}

/// POST /api/v1/chatbots/activate?chatbot_id= - Transition to active.
/// Already-active is an idempotent success.
pub async fn activate_chatbot(
    State(state): State<AppState>,
    Query(params): Query<ChatbotIdParam>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = request_id();

    let chatbot = state.chatbot_service.activate(&params.chatbot_id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::to_value(&chatbot).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}

/// POST /api/v1/chatbots/deactivate?chatbot_id= - Transition to inactive.
/// Chatbots are never deleted; this is the retirement path.
pub async fn deactivate_chatbot(
    State(state): State<AppState>,
    Query(params): Query<ChatbotIdParam>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = request_id();

    let chatbot = state.chatbot_service.deactivate(&params.chatbot_id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::to_value(&chatbot).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}

/// POST /api/v1/chatbots/update?chatbot_id= - Partial field update.
pub async fn update_chatbot(
    State(state): State<AppState>,
    Query(params): Query<ChatbotIdParam>,
    Json(body): Json<UpdateChatbotRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = request_id();

    if body.is_empty() {
        return Err(AppError::Validation(
            "update body must supply at least one field".to_string(),
        ));
    }

    let chatbot = state
        .chatbot_service
        .update(&params.chatbot_id, body)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::to_value(&chatbot).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}
