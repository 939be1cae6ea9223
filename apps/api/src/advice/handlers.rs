//! Axum route handlers for the career-advice service.
//!
//! Every endpoint is one LLM call plus optional persistence. Persistence
//! failures are logged and swallowed: the store is a convenience, and a
//! failed write must never turn a successful analysis into an error.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::advice::models::{
    CareerAdviceRequest, CareerRecommendation, FreeAnalysisRequest, RecommendRequest,
    RoadmapRequest, SkillGap, SkillGapRequest, TrendRow, UserProfileRow, UserSkillRow,
};
use crate::advice::prompts::{
    CAREER_ADVICE_SYSTEM, FREE_ANALYSIS_SYSTEM, RECOMMEND_SYSTEM, ROADMAP_SYSTEM,
    SKILL_GAP_SYSTEM,
};
use crate::advice::queries::{
    fetch_trends, fetch_user_profile, fetch_user_skills, save_recommendations, save_skill_gaps,
};
use crate::errors::AppError;
use crate::llm_client::ChatApi;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Prompt-building helpers
// ────────────────────────────────────────────────────────────────────────────

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn skills_block(skills: &[UserSkillRow]) -> String {
    if skills.is_empty() {
        return "No skills registered yet.".to_string();
    }
    skills
        .iter()
        .map(|s| {
            format!(
                "- {} ({}) - level {}, {}y exp",
                s.skill_name,
                s.category.as_deref().unwrap_or("Uncategorized"),
                s.proficiency_level
                    .map_or_else(|| "N/A".to_string(), |p| p.to_string()),
                s.years_of_experience.unwrap_or(0)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn skills_inline(skills: &[UserSkillRow]) -> String {
    if skills.is_empty() {
        return "None".to_string();
    }
    skills
        .iter()
        .map(|s| s.skill_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn trends_block(trends: &[TrendRow]) -> String {
    if trends.is_empty() {
        return "No trends available.".to_string();
    }
    trends
        .iter()
        .map(|t| format!("- {} ({})", t.title, t.domain.as_deref().unwrap_or("General")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves the effective target role: request override first, profile
/// second. Missing both is a caller error, not an LLM problem.
fn resolve_target_role(
    requested: &Option<String>,
    profile: &UserProfileRow,
) -> Result<String, AppError> {
    requested
        .as_deref()
        .filter(|role| !role.trim().is_empty())
        .or(profile.target_role.as_deref())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Validation(
                "No target role specified. Set it in your profile or in the request.".to_string(),
            )
        })
}

/// Unwraps a JSON value into a list, tolerating the object-wrapped shapes
/// models favor (`{"gaps": [...]}` instead of `[...]`).
fn coerce_list(value: Value, wrapper_keys: &[&str]) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in wrapper_keys {
                if let Some(Value::Array(items)) = map.remove(*key) {
                    return items;
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

async fn load_profile(state: &AppState, user_id: uuid::Uuid) -> Result<UserProfileRow, AppError> {
    fetch_user_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze-skill-gaps
///
/// Identifies missing or weak skills for the user's target role, persists
/// them, and returns the gap list.
pub async fn handle_analyze_skill_gaps(
    State(state): State<AppState>,
    Json(request): Json<SkillGapRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = load_profile(&state, request.user_id).await?;
    let skills = fetch_user_skills(&state.db, request.user_id).await?;
    let target_role = resolve_target_role(&request.target_role, &profile)?;

    let user_prompt = format!(
        "User: {}\nCurrent role: {}\nTarget role: {}\nExperience: {} years\nEducation: {}\n\nCurrent skills:\n{}",
        or_na(&profile.full_name),
        or_na(&profile.current_role),
        target_role,
        profile
            .experience_years
            .map_or_else(|| "N/A".to_string(), |y| y.to_string()),
        or_na(&profile.education_level),
        skills_block(&skills),
    );

    let reply = state
        .llm
        .complete_json_required(SKILL_GAP_SYSTEM, &user_prompt)
        .await?;

    let gaps: Vec<SkillGap> = coerce_list(reply, &["gaps", "skill_gaps"])
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if let Err(e) = save_skill_gaps(&state.db, request.user_id, &gaps).await {
        warn!("Could not save skill gaps to DB: {e}");
    }

    Ok(Json(json!({
        "success": true,
        "target_role": target_role,
        "gaps": gaps,
    })))
}

/// POST /generate-roadmap
///
/// Generates a personalised learning roadmap. No persistence.
pub async fn handle_generate_roadmap(
    State(state): State<AppState>,
    Json(request): Json<RoadmapRequest>,
) -> Result<Json<Value>, AppError> {
    if !(1..=24).contains(&request.timeframe_months) {
        return Err(AppError::Validation(
            "timeframe_months must be between 1 and 24".to_string(),
        ));
    }

    let profile = load_profile(&state, request.user_id).await?;
    let skills = fetch_user_skills(&state.db, request.user_id).await?;
    let target_role = resolve_target_role(&request.target_role, &profile)?;

    let skills_text = if skills.is_empty() {
        "None".to_string()
    } else {
        skills
            .iter()
            .map(|s| {
                format!(
                    "- {} (level {})",
                    s.skill_name,
                    s.proficiency_level
                        .map_or_else(|| "N/A".to_string(), |p| p.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user_prompt = format!(
        "Target role: {}\nTimeframe: {} months\nCurrent role: {}\nExperience: {} years\n\nCurrent skills:\n{}\n\nGenerate a step-by-step roadmap.",
        target_role,
        request.timeframe_months,
        or_na(&profile.current_role),
        profile.experience_years.unwrap_or(0),
        skills_text,
    );

    let roadmap = state
        .llm
        .complete_json_required(ROADMAP_SYSTEM, &user_prompt)
        .await?;

    Ok(Json(json!({ "success": true, "data": roadmap })))
}

/// POST /recommend
///
/// Personalised recommendations from profile, skills, and recent trends.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<Value>, AppError> {
    if !(1..=20).contains(&request.count) {
        return Err(AppError::Validation(
            "count must be between 1 and 20".to_string(),
        ));
    }

    let profile = load_profile(&state, request.user_id).await?;
    let skills = fetch_user_skills(&state.db, request.user_id).await?;
    let trends = fetch_trends(&state.db, 10).await.unwrap_or_else(|e| {
        warn!("Could not fetch trends, continuing without them: {e}");
        Vec::new()
    });

    let user_prompt = format!(
        "User: {}\nCurrent role: {}\nTarget role: {}\nSkills: {}\n\nCurrent industry trends:\n{}\n\nProvide up to {} recommendations.",
        or_na(&profile.full_name),
        or_na(&profile.current_role),
        or_na(&profile.target_role),
        skills_inline(&skills),
        trends_block(&trends),
        request.count,
    );

    let reply = state
        .llm
        .complete_json_required(RECOMMEND_SYSTEM, &user_prompt)
        .await?;

    let recommendations: Vec<CareerRecommendation> = coerce_list(reply, &["recommendations"])
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if let Err(e) = save_recommendations(&state.db, request.user_id, &recommendations).await {
        warn!("Could not save recommendations: {e}");
    }

    Ok(Json(json!({ "success": true, "data": recommendations })))
}

/// POST /career-advice
///
/// Free-form career Q&A, personalised when a user id is supplied.
pub async fn handle_career_advice(
    State(state): State<AppState>,
    Json(request): Json<CareerAdviceRequest>,
) -> Result<Json<Value>, AppError> {
    if request.question.trim().chars().count() < 5 {
        return Err(AppError::Validation(
            "question must be at least 5 characters long".to_string(),
        ));
    }

    let mut context = String::new();
    if let Some(user_id) = request.user_id {
        if let Some(profile) = fetch_user_profile(&state.db, user_id).await? {
            let skills = fetch_user_skills(&state.db, user_id).await?;
            context = format!(
                "\n[User context]\nName: {}\nCurrent role: {}\nTarget role: {}\nExperience: {}y\nSkills: {}\n",
                or_na(&profile.full_name),
                or_na(&profile.current_role),
                or_na(&profile.target_role),
                profile
                    .experience_years
                    .map_or_else(|| "N/A".to_string(), |y| y.to_string()),
                skills_inline(&skills),
            );
        }
    }

    let user_prompt = format!("{}{}", request.question, context);
    let answer = state.llm.complete(CAREER_ADVICE_SYSTEM, &user_prompt).await?;

    Ok(Json(json!({ "success": true, "answer": answer })))
}

/// POST /analyze-free
///
/// Combined gap / roadmap / recommendation analysis with no database user.
pub async fn handle_analyze_free(
    State(state): State<AppState>,
    Json(request): Json<FreeAnalysisRequest>,
) -> Result<Json<Value>, AppError> {
    if request.skills.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::Validation(
            "skills must contain at least one entry".to_string(),
        ));
    }
    if request.target_role.trim().is_empty() {
        return Err(AppError::Validation(
            "target_role cannot be empty".to_string(),
        ));
    }

    let user_prompt = format!(
        "Current skills: {}\nTarget role: {}\n\nProvide a complete analysis.",
        request.skills.join(", "),
        request.target_role,
    );

    let result = state
        .llm
        .complete_json_required(FREE_ANALYSIS_SYSTEM, &user_prompt)
        .await?;

    Ok(Json(json!({ "success": true, "data": result })))
}

/// GET /models
///
/// Lists models available on the LLM backend. 503 when unreachable.
pub async fn handle_list_models(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let available = state.llm.list_models().await?;
    Ok(Json(json!({
        "success": true,
        "current_model": state.llm.model(),
        "available": available,
    })))
}

/// GET /health
///
/// Probes LLM and database connectivity. Always 200; the body says what is
/// actually reachable.
pub async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    let llm_connected = state.llm.list_models().await.is_ok();
    let db_connected = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    let connected = |ok: bool| if ok { "connected" } else { "disconnected" };

    Json(json!({
        "success": llm_connected && db_connected,
        "services": {
            "llm": connected(llm_connected),
            "database": connected(db_connected),
        },
        "model": state.llm.model(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_list_passes_arrays_through() {
        let items = coerce_list(json!([1, 2, 3]), &["gaps"]);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_coerce_list_unwraps_named_keys_in_order() {
        let wrapped = json!({"skill_gaps": [{"skill_name": "Go"}]});
        let items = coerce_list(wrapped, &["gaps", "skill_gaps"]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_coerce_list_rejects_unrelated_shapes() {
        assert!(coerce_list(json!({"note": "nothing"}), &["gaps"]).is_empty());
        assert!(coerce_list(json!("prose"), &["gaps"]).is_empty());
    }

    #[test]
    fn test_resolve_target_role_prefers_request_override() {
        let profile = UserProfileRow {
            full_name: None,
            email: None,
            current_role: None,
            target_role: Some("Data Engineer".into()),
            experience_years: None,
            education_level: None,
            preferred_domains: None,
            bio: None,
        };
        let role = resolve_target_role(&Some("ML Engineer".into()), &profile).unwrap();
        assert_eq!(role, "ML Engineer");

        let fallback = resolve_target_role(&None, &profile).unwrap();
        assert_eq!(fallback, "Data Engineer");

        let blank_override = resolve_target_role(&Some("  ".into()), &profile).unwrap();
        assert_eq!(blank_override, "Data Engineer");
    }

    #[test]
    fn test_resolve_target_role_errors_when_absent_everywhere() {
        let profile = UserProfileRow {
            full_name: None,
            email: None,
            current_role: None,
            target_role: None,
            experience_years: None,
            education_level: None,
            preferred_domains: None,
            bio: None,
        };
        let err = resolve_target_role(&None, &profile).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_skills_block_formats_rows_and_placeholder() {
        assert_eq!(skills_block(&[]), "No skills registered yet.");
        let rows = vec![UserSkillRow {
            skill_name: "Rust".into(),
            category: Some("Programming Language".into()),
            proficiency_level: Some(4),
            years_of_experience: Some(3),
        }];
        let block = skills_block(&rows);
        assert!(block.contains("Rust"));
        assert!(block.contains("level 4"));
        assert!(block.contains("3y exp"));
    }

    #[test]
    fn test_trends_block_placeholder() {
        assert_eq!(trends_block(&[]), "No trends available.");
    }
}
