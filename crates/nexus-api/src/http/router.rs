//! Axum router configuration with middleware.
//!
//! All routes are under `/api`. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{delete, get, patch, post};
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
        // Conversation CRUD
        .route("/conversations", post(handlers::conversation::create_conversation))
        .route("/conversations", get(handlers::conversation::list_conversations))
        .route("/conversations/{id}", get(handlers::conversation::get_conversation))
        .route("/conversations/{id}", patch(handlers::conversation::update_conversation))
        .route("/conversations/{id}", delete(handlers::conversation::delete_conversation))
        .route(
            "/conversations/{id}/generate-title",
            post(handlers::conversation::generate_title),
        )
        // The streaming turn endpoint
        .route(
            "/conversations/{id}/messages",
            post(handlers::turn::send_message),
        )
        // Training instruction management
        .route(
            "/training/verify-password",
            post(handlers::training::verify_password),
        )
        .route(
            "/training/instructions/list",
            post(handlers::training::list_instructions),
        )
        .route(
            "/training/instructions",
            post(handlers::training::create_instruction),
        )
        .route(
            "/training/instructions/{id}",
            delete(handlers::training::delete_instruction),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
