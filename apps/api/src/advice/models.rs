//! Request, row, and persistence types for the career-advice service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SkillGapRequest {
    pub user_id: Uuid,
    /// Overrides the profile's target role when present.
    #[serde(default)]
    pub target_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default = "default_timeframe_months")]
    pub timeframe_months: i32,
}

fn default_timeframe_months() -> i32 {
    6
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub user_id: Uuid,
    #[serde(default = "default_recommendation_count")]
    pub count: i64,
}

fn default_recommendation_count() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct CareerAdviceRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub question: String,
}

/// Analyse a skill set without requiring a database user.
#[derive(Debug, Deserialize)]
pub struct FreeAnalysisRequest {
    pub skills: Vec<String>,
    pub target_role: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Database rows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfileRow {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub current_role: Option<String>,
    pub target_role: Option<String>,
    pub experience_years: Option<i32>,
    pub education_level: Option<String>,
    pub preferred_domains: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSkillRow {
    pub skill_name: String,
    pub category: Option<String>,
    pub proficiency_level: Option<i32>,
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrendRow {
    pub id: Uuid,
    pub title: String,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

// ────────────────────────────────────────────────────────────────────────────
// LLM output rows headed for persistence
// ────────────────────────────────────────────────────────────────────────────

/// One skill gap as the model reports it. Defaults mirror what the store
/// expects when the model omits optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    #[serde(default)]
    pub skill_name: String,
    #[serde(default = "default_gap_domain")]
    pub domain: String,
    #[serde(default = "default_gap_level")]
    pub gap_level: i32,
    #[serde(default = "default_gap_reason")]
    pub reason: String,
}

fn default_gap_domain() -> String {
    "General".to_string()
}

fn default_gap_level() -> i32 {
    3
}

fn default_gap_reason() -> String {
    "Identified by AI analysis".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerRecommendation {
    #[serde(rename = "type", default = "default_recommendation_type")]
    pub rec_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

fn default_recommendation_type() -> String {
    "skill".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skill_gap_defaults_fill_missing_fields() {
        let gap: SkillGap = serde_json::from_value(json!({"skill_name": "Kubernetes"})).unwrap();
        assert_eq!(gap.skill_name, "Kubernetes");
        assert_eq!(gap.domain, "General");
        assert_eq!(gap.gap_level, 3);
        assert_eq!(gap.reason, "Identified by AI analysis");
    }

    #[test]
    fn test_recommendation_type_key_is_renamed() {
        let rec: CareerRecommendation = serde_json::from_value(json!({
            "type": "course",
            "title": "Learn Rust",
            "content": "Work through the async book.",
            "skill_name": "Rust",
            "priority": "high"
        }))
        .unwrap();
        assert_eq!(rec.rec_type, "course");
        let back = serde_json::to_value(&rec).unwrap();
        assert_eq!(back["type"], "course");
    }

    #[test]
    fn test_roadmap_request_defaults_timeframe() {
        let req: RoadmapRequest =
            serde_json::from_value(json!({"user_id": Uuid::new_v4()})).unwrap();
        assert_eq!(req.timeframe_months, 6);
    }

    #[test]
    fn test_recommend_request_defaults_count() {
        let req: RecommendRequest =
            serde_json::from_value(json!({"user_id": Uuid::new_v4()})).unwrap();
        assert_eq!(req.count, 5);
    }
}
