pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route(
            "/api/v1/interviews",
            post(handlers::handle_start_interview).get(handlers::handle_list_interviews),
        )
        .route(
            "/api/v1/interviews/answer",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/answer/voice",
            post(handlers::handle_submit_answer_voice),
        )
        .route(
            "/api/v1/interviews/:id",
            get(handlers::handle_get_interview),
        )
        .with_state(state)
}
