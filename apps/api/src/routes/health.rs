use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health for the transform service. The pipeline has no database
/// dependency, so only LLM connectivity is probed.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let llm_connected = state.llm.list_models().await.is_ok();
    Json(json!({
        "success": llm_connected,
        "services": {
            "llm": if llm_connected { "connected" } else { "disconnected" },
        },
        "model": state.llm.model(),
    }))
}
