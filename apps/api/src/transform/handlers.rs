//! Axum route handlers for the job-transformation service.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::transform::models::JobAnalysis;
use crate::transform::pipeline::analyze_job;
use crate::transform::validate::validate_job_position;

#[derive(Debug, Deserialize)]
pub struct AnalyzeJobRequest {
    #[serde(default)]
    pub job_position: String,
}

/// POST /analyze-job
///
/// Validates the job title, runs the six-stage pipeline, and returns the
/// complete analysis. 400 on validation failure, 503 when the LLM is
/// unreachable, 500 on any other pipeline failure.
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeJobRequest>,
) -> Result<Json<JobAnalysis>, AppError> {
    validate_job_position(&request.job_position).map_err(AppError::Validation)?;

    let analysis = analyze_job(&state.llm, &request.job_position).await?;

    Ok(Json(analysis))
}
