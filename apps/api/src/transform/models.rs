//! Typed payloads flowing between the six pipeline stages.
//!
//! Every field the model fills is `#[serde(default)]`: a partially valid
//! reply deserializes into a partially filled value instead of failing the
//! stage. Wire keys match the JSON schemas the stage prompts demand.

use serde::{Deserialize, Serialize, Serializer};

// ────────────────────────────────────────────────────────────────────────────
// Stage 1 — job description
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Responsibility {
    #[serde(default)]
    pub responsibility: String,
    #[serde(default)]
    pub importance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    #[serde(default)]
    pub job_title: String,
    /// The describer prompt asks for a capitalized `Description` key; the
    /// alias keeps lowercase replies usable.
    #[serde(rename = "Description", alias = "description", default)]
    pub description: String,
    #[serde(default)]
    pub key_responsibilities: Vec<Responsibility>,
    #[serde(default)]
    pub essential_requirements: Vec<String>,
}

impl JobDescription {
    /// An empty shell carries no signal; the verification fallback rule
    /// treats it the same as an absent one.
    pub fn is_empty(&self) -> bool {
        self.job_title.is_empty()
            && self.description.is_empty()
            && self.key_responsibilities.is_empty()
            && self.essential_requirements.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2 — tasks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 3 — verification
// ────────────────────────────────────────────────────────────────────────────

/// Verifier output. `verification_status` stays a free string: the prompt
/// asks for APPROVED or MODIFIED but the model is not trusted to comply, and
/// the fallback rule below must hold for any status value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationResult {
    #[serde(default)]
    pub verification_status: String,
    #[serde(default)]
    pub corrections_made: Vec<String>,
    #[serde(default)]
    pub validated_job_description: Option<JobDescription>,
    #[serde(default)]
    pub validated_tasks: Option<Vec<Task>>,
}

impl VerificationResult {
    pub fn is_modified(&self) -> bool {
        self.verification_status.eq_ignore_ascii_case("modified")
    }

    /// Applies the fallback rule: a validated replacement wins only when it
    /// is present and non-empty, otherwise the pre-verification value is
    /// retained. Never silently drops data.
    pub fn validated_or(
        &self,
        job_description: JobDescription,
        tasks: Vec<Task>,
    ) -> (JobDescription, Vec<Task>) {
        let job_description = match &self.validated_job_description {
            Some(revised) if !revised.is_empty() => revised.clone(),
            _ => job_description,
        };
        let tasks = match &self.validated_tasks {
            Some(revised) if !revised.is_empty() => revised.clone(),
            _ => tasks,
        };
        (job_description, tasks)
    }
}

/// The slice of verification carried into the final report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationInfo {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub corrections: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 4 — automation analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomationAssessment {
    #[serde(default)]
    pub task: String,
    /// FULLY_AUTOMATED | PARTIALLY_AUTOMATED | NOT_AUTOMATABLE, as the
    /// prompt requests; untrusted, so kept as a string.
    #[serde(default)]
    pub automation_category: String,
    #[serde(default)]
    pub ai_involvement_percentage: Option<i64>,
    #[serde(default)]
    pub time_saved_percentage: Option<i64>,
    #[serde(default)]
    pub ai_technologies: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallMetrics {
    #[serde(default)]
    pub average_automation_percentage: Option<f64>,
    #[serde(default)]
    pub estimated_time_savings: String,
    #[serde(default)]
    pub automation_readiness: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomationReport {
    #[serde(default)]
    pub automation_analysis: Vec<AutomationAssessment>,
    #[serde(default)]
    pub overall_metrics: OverallMetrics,
}

/// One row of the task-analysis summary, positionally aligned to the
/// validated task list. Missing data serializes as the string "N/A" so the
/// report renderer and the frontend see a uniform table.
#[derive(Debug, Clone, Serialize)]
pub struct TaskAnalysisRow {
    pub task_name: String,
    #[serde(serialize_with = "percent_or_na")]
    pub ai_involvement_percentage: Option<i64>,
    #[serde(serialize_with = "percent_or_na")]
    pub time_saved_percentage: Option<i64>,
    pub automation_category: String,
    pub ai_technologies: Vec<String>,
    pub explanation: String,
}

/// Serializes a percentage clamped to [0, 100], or "N/A" when absent. The
/// model is not trusted to stay in range, and an out-of-range value should
/// not abort a run that parsing already survived.
fn percent_or_na<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(n) => serializer.serialize_i64((*n).clamp(0, 100)),
        None => serializer.serialize_str("N/A"),
    }
}

/// "FULLY_AUTOMATED" -> "Fully Automated"; empty input reads as no data.
pub fn humanize_category(category: &str) -> String {
    if category.trim().is_empty() {
        return "N/A".to_string();
    }
    category
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 5 — strategic recommendations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillRecommendation {
    #[serde(default)]
    pub skill_area: String,
    #[serde(default)]
    pub specific_skills: Vec<String>,
    #[serde(default)]
    pub relevance_to_ai_role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SustainabilityInitiative {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub initiative: String,
    #[serde(default)]
    pub impact_metric: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(default)]
    pub opportunity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub potential_value_proposition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub future_skill_recommendations: Vec<SkillRecommendation>,
    #[serde(default)]
    pub sustainability_plan: Vec<SustainabilityInitiative>,
    #[serde(default)]
    pub opportunities_identification: Vec<Opportunity>,
}

// ────────────────────────────────────────────────────────────────────────────
// Final report
// ────────────────────────────────────────────────────────────────────────────

/// Input handed to the render stage. Serialized, stripped of empty fields,
/// and embedded in the render prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub job_position: String,
    pub job_description: JobDescription,
    pub extracted_tasks: Vec<Task>,
    pub task_analysis_summary: Vec<TaskAnalysisRow>,
    pub overall_metrics: OverallMetrics,
    pub verification_info: VerificationInfo,
    pub future_skill_recommendations: Vec<SkillRecommendation>,
    pub sustainability_plan: Vec<SustainabilityInitiative>,
    pub opportunities_identification: Vec<Opportunity>,
}

/// The complete analysis returned by `POST /analyze-job`. Immutable once
/// built; owned by the single pipeline run that created it.
#[derive(Debug, Clone, Serialize)]
pub struct JobAnalysis {
    pub job_position: String,
    pub job_description: JobDescription,
    pub extracted_tasks: Vec<Task>,
    pub automation_categorization: AutomationReport,
    pub overall_metrics: OverallMetrics,
    pub verification_info: VerificationInfo,
    pub future_skill_recommendations: Vec<SkillRecommendation>,
    pub sustainability_plan: Vec<SustainabilityInitiative>,
    pub opportunities_identification: Vec<Opportunity>,
    pub task_analysis_summary: Vec<TaskAnalysisRow>,
    pub html_report: String,
    pub status: String,
    pub backend_logs: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_description_accepts_capitalized_description_key() {
        let parsed: JobDescription = serde_json::from_value(json!({
            "job_title": "Backend Developer",
            "Description": "Builds and maintains server-side systems.",
            "key_responsibilities": [
                {"responsibility": "Design APIs", "importance": "High"}
            ],
            "essential_requirements": ["Rust", "SQL"]
        }))
        .unwrap();
        assert_eq!(parsed.job_title, "Backend Developer");
        assert_eq!(parsed.description, "Builds and maintains server-side systems.");
        assert_eq!(parsed.key_responsibilities.len(), 1);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn test_job_description_partial_reply_degrades_not_fails() {
        let parsed: JobDescription =
            serde_json::from_value(json!({"job_title": "DBA"})).unwrap();
        assert_eq!(parsed.job_title, "DBA");
        assert!(parsed.description.is_empty());
        assert!(parsed.key_responsibilities.is_empty());
    }

    #[test]
    fn test_empty_shell_is_empty() {
        assert!(JobDescription::default().is_empty());
        let parsed: JobDescription = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_verification_fallback_keeps_originals_when_validated_empty() {
        let verification: VerificationResult = serde_json::from_value(json!({
            "verification_status": "APPROVED",
            "corrections_made": [],
            "validated_job_description": {},
            "validated_tasks": []
        }))
        .unwrap();

        let original_jd = JobDescription {
            job_title: "Backend Developer".into(),
            ..Default::default()
        };
        let original_tasks = vec![Task {
            task_name: "Design APIs".into(),
            description: String::new(),
        }];

        let (jd, tasks) = verification.validated_or(original_jd.clone(), original_tasks.clone());
        assert_eq!(jd, original_jd);
        assert_eq!(tasks, original_tasks);
    }

    #[test]
    fn test_verification_fallback_uses_revisions_when_nonempty() {
        let verification: VerificationResult = serde_json::from_value(json!({
            "verification_status": "MODIFIED",
            "corrections_made": ["renamed task"],
            "validated_job_description": {"job_title": "Senior Backend Developer"},
            "validated_tasks": [{"task_name": "Design REST APIs", "description": ""}]
        }))
        .unwrap();
        assert!(verification.is_modified());

        let (jd, tasks) = verification.validated_or(JobDescription::default(), vec![]);
        assert_eq!(jd.job_title, "Senior Backend Developer");
        assert_eq!(tasks[0].task_name, "Design REST APIs");
    }

    #[test]
    fn test_verification_status_case_insensitive() {
        let verification = VerificationResult {
            verification_status: "Modified".into(),
            ..Default::default()
        };
        assert!(verification.is_modified());
    }

    #[test]
    fn test_task_analysis_row_serializes_na_for_missing_data() {
        let row = TaskAnalysisRow {
            task_name: "Write migrations".into(),
            ai_involvement_percentage: None,
            time_saved_percentage: Some(40),
            automation_category: "N/A".into(),
            ai_technologies: vec![],
            explanation: String::new(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["ai_involvement_percentage"], json!("N/A"));
        assert_eq!(value["time_saved_percentage"], json!(40));
    }

    #[test]
    fn test_task_analysis_row_clamps_out_of_range_percentages() {
        let row = TaskAnalysisRow {
            task_name: "t".into(),
            ai_involvement_percentage: Some(130),
            time_saved_percentage: Some(-5),
            automation_category: "Fully Automated".into(),
            ai_technologies: vec![],
            explanation: String::new(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["ai_involvement_percentage"], json!(100));
        assert_eq!(value["time_saved_percentage"], json!(0));
    }

    #[test]
    fn test_humanize_category() {
        assert_eq!(humanize_category("FULLY_AUTOMATED"), "Fully Automated");
        assert_eq!(
            humanize_category("PARTIALLY_AUTOMATED"),
            "Partially Automated"
        );
        assert_eq!(humanize_category("NOT_AUTOMATABLE"), "Not Automatable");
        assert_eq!(humanize_category(""), "N/A");
        assert_eq!(humanize_category("  "), "N/A");
    }

    #[test]
    fn test_automation_report_tolerates_partial_metrics() {
        let report: AutomationReport = serde_json::from_value(json!({
            "automation_analysis": [
                {"task": "Code review", "automation_category": "PARTIALLY_AUTOMATED",
                 "ai_involvement_percentage": 60}
            ]
        }))
        .unwrap();
        assert_eq!(report.automation_analysis.len(), 1);
        assert_eq!(report.automation_analysis[0].time_saved_percentage, None);
        assert!(report.overall_metrics.estimated_time_savings.is_empty());
    }

    #[test]
    fn test_overall_metrics_accepts_integer_average() {
        let metrics: OverallMetrics = serde_json::from_value(json!({
            "average_automation_percentage": 65,
            "estimated_time_savings": "40-50% overall time reduction",
            "automation_readiness": "High"
        }))
        .unwrap();
        assert_eq!(metrics.average_automation_percentage, Some(65.0));
    }

    #[test]
    fn test_recommendations_default_to_empty_lists() {
        let recs: Recommendations = serde_json::from_value(json!({})).unwrap();
        assert!(recs.future_skill_recommendations.is_empty());
        assert!(recs.sustainability_plan.is_empty());
        assert!(recs.opportunities_identification.is_empty());
    }
}
