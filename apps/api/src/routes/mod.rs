pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::advice::handlers as advice;
use crate::state::AppState;
use crate::transform::handlers as transform;

/// Router for the job-transformation service.
pub fn transform_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze-job", post(transform::handle_analyze_job))
        .with_state(state)
}

/// Router for the career-advice service.
pub fn advice_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(advice::handle_health))
        .route("/models", get(advice::handle_list_models))
        .route("/analyze-skill-gaps", post(advice::handle_analyze_skill_gaps))
        .route("/generate-roadmap", post(advice::handle_generate_roadmap))
        .route("/recommend", post(advice::handle_recommend))
        .route("/career-advice", post(advice::handle_career_advice))
        .route("/analyze-free", post(advice::handle_analyze_free))
        .with_state(state)
}
