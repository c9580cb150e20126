//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chatbot directory and registration
        .route(
            "/chatbots",
            get(handlers::chatbot::get_chatbots).post(handlers::chatbot::create_chatbot),
        )
        .route("/chatbots/search", post(handlers::chatbot::search_chatbots))
        // Mutations, addressed by ?chatbot_id=
        .route("/chatbots/activate", post(handlers::chatbot::activate_chatbot))
        .route(
            "/chatbots/deactivate",
            post(handlers::chatbot::deactivate_chatbot),
        )
        .route("/chatbots/update", post(handlers::chatbot::update_chatbot))
        // Dashboard login
        .route("/login", post(handlers::auth::login))
        // Telegram webhook
        .route("/telegram", post(handlers::telegram::webhook));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
