//! HTTP API surface

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub mod models;
pub mod opportunities;
pub mod organizations;
pub mod users;

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/opportunities",
            post(opportunities::create).get(opportunities::list),
        )
        .route(
            "/opportunities/:id",
            get(opportunities::get_one)
                .put(opportunities::update)
                .delete(opportunities::remove),
        )
        .route(
            "/organizations",
            post(organizations::create).get(organizations::list),
        )
        .route("/users", post(users::create).get(users::list))
        .route("/users/:id", get(users::get_profile).put(users::update))
        .with_state(state)
}

/// Health check
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "hearts-server",
        "version": crate::VERSION,
    }))
}
