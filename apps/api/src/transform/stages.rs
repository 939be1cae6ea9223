//! Stage functions: one LLM role per function, each a single chat call
//! followed by JSON recovery and typed coercion.
//!
//! Failure semantics are uniform across stages: a transport-level failure
//! aborts the run with a `PipelineError` naming the stage; an unparsable or
//! empty reply degrades to the stage's typed default and the run continues.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::AppError;
use crate::llm_client::{ChatApi, LlmError};
use crate::extract::Extracted;
use crate::transform::models::{
    AutomationAssessment, AutomationReport, JobDescription, Recommendations, ReportPayload, Task,
    VerificationResult,
};
use crate::transform::pipeline::RunLog;
use crate::transform::prompts::{
    AUTOMATION_PROMPT_TEMPLATE, AUTOMATION_SYSTEM, JOB_DESCRIBER_SYSTEM,
    RECOMMENDATION_PROMPT_TEMPLATE, RECOMMENDATION_SYSTEM, RENDER_PROMPT_TEMPLATE,
    TASK_EXTRACTOR_PROMPT_TEMPLATE, TASK_EXTRACTOR_SYSTEM, VERIFIER_PROMPT_TEMPLATE,
    VERIFIER_SYSTEM,
};

/// Identity of a pipeline stage, carried in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Describe,
    ExtractTasks,
    Verify,
    Automation,
    Recommend,
    Render,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Describe => "job description",
            Stage::ExtractTasks => "task extraction",
            Stage::Verify => "verification",
            Stage::Automation => "automation analysis",
            Stage::Recommend => "recommendation",
            Stage::Render => "report rendering",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal pipeline failure: the underlying chat call could not reach the
/// model. Parse-level problems never produce this; they degrade in place.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: LlmError,
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match &e.source {
            LlmError::Unavailable(msg) => {
                AppError::LlmUnavailable(format!("{} stage: {msg}", e.stage))
            }
            other => AppError::Pipeline {
                stage: e.stage.as_str(),
                message: other.to_string(),
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Runs one stage's chat call and JSON recovery. Transport failures abort;
/// everything else (empty reply, unparsable reply) degrades to `Empty`.
async fn stage_extract(
    chat: &dyn ChatApi,
    stage: Stage,
    system: &str,
    user: &str,
    log: &mut RunLog,
) -> Result<Extracted, PipelineError> {
    match chat.complete_extracted(system, user).await {
        Ok(extracted) => {
            if extracted.is_empty() {
                log.warn(format!(
                    "{stage} stage produced no parsable JSON; continuing with empty defaults"
                ));
            }
            Ok(extracted)
        }
        Err(source @ LlmError::Unavailable(_)) => Err(PipelineError { stage, source }),
        Err(other) => {
            log.warn(format!(
                "{stage} stage returned no usable content ({other}); continuing with empty defaults"
            ));
            Ok(Extracted::Empty)
        }
    }
}

/// Coerces an extracted value into a stage's typed output, degrading to the
/// default on shape mismatch. `Empty` always coerces cleanly because every
/// field is `#[serde(default)]`.
fn coerce_object<T>(extracted: Extracted, stage: Stage, log: &mut RunLog) -> T
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_value::<T>(extracted.into_value()) {
        Ok(value) => value,
        Err(e) => {
            log.warn(format!(
                "{stage} stage output did not match the expected shape ({e}); continuing with empty defaults"
            ));
            T::default()
        }
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Stages 1-5
// ────────────────────────────────────────────────────────────────────────────

/// Stage 1: job title in, structured description out.
pub async fn describe_job(
    chat: &dyn ChatApi,
    job_position: &str,
    log: &mut RunLog,
) -> Result<JobDescription, PipelineError> {
    log.info(format!("Getting job description for: {job_position}"));
    let extracted = stage_extract(chat, Stage::Describe, JOB_DESCRIBER_SYSTEM, job_position, log)
        .await?;
    Ok(coerce_object(extracted, Stage::Describe, log))
}

/// Stage 2: job description in, task list out. An object-wrapped list under
/// a `tasks` key is unwrapped; any other object shape reads as no data.
pub async fn extract_tasks(
    chat: &dyn ChatApi,
    job_description: &JobDescription,
    log: &mut RunLog,
) -> Result<Vec<Task>, PipelineError> {
    log.info("Extracting tasks from job description");
    let prompt =
        TASK_EXTRACTOR_PROMPT_TEMPLATE.replace("{job_description}", &to_pretty_json(job_description));
    let extracted =
        stage_extract(chat, Stage::ExtractTasks, TASK_EXTRACTOR_SYSTEM, &prompt, log).await?;
    Ok(coerce_task_list(extracted, log))
}

fn coerce_task_list(extracted: Extracted, log: &mut RunLog) -> Vec<Task> {
    let items = match extracted {
        Extracted::Array(items) => items,
        Extracted::Object(mut map) => match map.remove("tasks") {
            Some(Value::Array(items)) => items,
            _ => {
                log.warn("task extraction returned an object with no task list; continuing with no tasks");
                return Vec::new();
            }
        },
        Extracted::Empty => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Task>(item) {
            Ok(task) => Some(task),
            Err(e) => {
                log.warn(format!("skipping unusable task entry: {e}"));
                None
            }
        })
        .collect()
}

/// Stage 3: reviews the description and tasks together.
pub async fn verify(
    chat: &dyn ChatApi,
    job_description: &JobDescription,
    tasks: &[Task],
    log: &mut RunLog,
) -> Result<VerificationResult, PipelineError> {
    log.info("Verifying and validating data");
    let prompt = VERIFIER_PROMPT_TEMPLATE
        .replace("{job_description}", &to_pretty_json(job_description))
        .replace("{tasks}", &to_pretty_json(&tasks));
    let extracted = stage_extract(chat, Stage::Verify, VERIFIER_SYSTEM, &prompt, log).await?;
    Ok(coerce_object(extracted, Stage::Verify, log))
}

/// Stage 4: per-task automation potential plus aggregate metrics. A bare
/// array reads as the analysis list with default metrics.
pub async fn categorize_automation(
    chat: &dyn ChatApi,
    tasks: &[Task],
    log: &mut RunLog,
) -> Result<AutomationReport, PipelineError> {
    log.info("Categorizing tasks by automation potential");
    let prompt = AUTOMATION_PROMPT_TEMPLATE.replace("{tasks}", &to_pretty_json(&tasks));
    let extracted = stage_extract(chat, Stage::Automation, AUTOMATION_SYSTEM, &prompt, log).await?;

    match extracted {
        Extracted::Array(items) => {
            let automation_analysis = items
                .into_iter()
                .filter_map(|item| {
                    serde_json::from_value::<AutomationAssessment>(item).ok()
                })
                .collect();
            Ok(AutomationReport {
                automation_analysis,
                ..Default::default()
            })
        }
        other => Ok(coerce_object(other, Stage::Automation, log)),
    }
}

/// Stage 5: strategic recommendations from the validated description and the
/// automation analysis.
pub async fn recommend(
    chat: &dyn ChatApi,
    job_description: &JobDescription,
    automation_analysis: &[AutomationAssessment],
    log: &mut RunLog,
) -> Result<Recommendations, PipelineError> {
    log.info("Generating AI transition recommendations");
    let job_title = if job_description.job_title.is_empty() {
        "N/A"
    } else {
        job_description.job_title.as_str()
    };
    let prompt = RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{job_title}", job_title)
        .replace("{automation_analysis}", &to_pretty_json(&automation_analysis));
    let extracted = stage_extract(chat, Stage::Recommend, RECOMMENDATION_SYSTEM, &prompt, log).await?;
    Ok(coerce_object(extracted, Stage::Recommend, log))
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 6 — HTML rendering
// ────────────────────────────────────────────────────────────────────────────

/// The canonical report sections, in render order, keyed by the payload
/// field that feeds each one. The renderer may emit these and nothing else;
/// a section whose payload field is filtered out is omitted entirely.
pub const REPORT_SECTIONS: [(&str, &str); 7] = [
    ("job_description", "Job Description"),
    ("extracted_tasks", "Extracted Tasks"),
    ("task_analysis_summary", "AI Task Analysis"),
    ("overall_metrics", "Overall Metrics"),
    ("future_skill_recommendations", "Future Skill Recommendations"),
    ("sustainability_plan", "Workforce Sustainability Plan"),
    ("opportunities_identification", "New Opportunities"),
];

/// Builds the render-stage system prompt from the canonical section list, so
/// the whitelist in code and the whitelist the model sees cannot drift.
pub fn render_system_prompt() -> String {
    let sections = REPORT_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, (_, title))| format!("{}. **{title}**", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert HTML visualization generator. Your role is to create a clean, readable, and responsive HTML report based on a provided JSON object.

Your task is to generate an HTML report with the following sections, in this specific order:
{sections}

RULES:
- The final output MUST be a single HTML string.
- Use modern HTML5 and self-contained CSS within a `<style>` tag. Do not use external stylesheets or JavaScript.
- The design must be professional, clean, and easy to read. Use text formats, lists, and tables where appropriate.
- Include visual elements like progress bars for automation percentages and color-coded categories (green for fully automated, yellow for partial, red for not automatable).
- **Crucially, if any section's data is missing or the list is empty in the input JSON, DO NOT render that section in the HTML report.**
- Under no circumstances should you include any section not in the list above. Only include the sections explicitly listed.
- Do not include any explanations or text outside of the HTML content itself."#
    )
}

/// Serializes the report payload with empty and falsy top-level fields
/// removed, so the renderer never sees a section it must not emit.
pub fn filter_report_payload(payload: &ReportPayload) -> Map<String, Value> {
    let value = serde_json::to_value(payload).unwrap_or_default();
    match value {
        Value::Object(map) => map.into_iter().filter(|(_, v)| !is_falsy(v)).collect(),
        _ => Map::new(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Stage 6: renders the final HTML report. An unusable reply degrades to an
/// empty report string rather than failing the run.
pub async fn render_report(
    chat: &dyn ChatApi,
    payload: &ReportPayload,
    log: &mut RunLog,
) -> Result<String, PipelineError> {
    log.info(format!("Generating HTML report for: {}", payload.job_position));
    let filtered = Value::Object(filter_report_payload(payload));
    let prompt = RENDER_PROMPT_TEMPLATE.replace("{report_data}", &to_pretty_json(&filtered));

    match chat.complete(&render_system_prompt(), &prompt).await {
        Ok(html) => {
            log.info("Successfully generated HTML report");
            Ok(strip_html_fences(&html).trim().to_string())
        }
        Err(source @ LlmError::Unavailable(_)) => Err(PipelineError {
            stage: Stage::Render,
            source,
        }),
        Err(other) => {
            log.warn(format!(
                "report rendering returned no usable content ({other}); continuing without HTML"
            ));
            Ok(String::new())
        }
    }
}

/// Strips a ```html fence if the model wrapped its report in one.
fn strip_html_fences(text: &str) -> &str {
    match text.split_once("```html") {
        Some((_, after)) => match after.split_once("```") {
            Some((inner, _)) => inner,
            None => after,
        },
        None => text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::models::{OverallMetrics, VerificationInfo};
    use serde_json::json;

    fn payload_with_empty_recommendations() -> ReportPayload {
        ReportPayload {
            job_position: "Backend Developer".into(),
            job_description: JobDescription {
                job_title: "Backend Developer".into(),
                ..Default::default()
            },
            extracted_tasks: vec![Task {
                task_name: "Design APIs".into(),
                description: "REST endpoints".into(),
            }],
            task_analysis_summary: vec![],
            overall_metrics: OverallMetrics::default(),
            verification_info: VerificationInfo::default(),
            future_skill_recommendations: vec![],
            sustainability_plan: vec![],
            opportunities_identification: vec![],
        }
    }

    #[test]
    fn test_filter_drops_empty_lists_and_strings() {
        let filtered = filter_report_payload(&payload_with_empty_recommendations());
        assert!(filtered.contains_key("job_position"));
        assert!(filtered.contains_key("job_description"));
        assert!(filtered.contains_key("extracted_tasks"));
        // Empty sections must not reach the renderer at all.
        assert!(!filtered.contains_key("future_skill_recommendations"));
        assert!(!filtered.contains_key("sustainability_plan"));
        assert!(!filtered.contains_key("opportunities_identification"));
        assert!(!filtered.contains_key("task_analysis_summary"));
    }

    #[test]
    fn test_every_filtered_section_key_is_canonical() {
        // Any payload key the renderer maps to a section must be whitelisted.
        let filtered = filter_report_payload(&payload_with_empty_recommendations());
        let canonical: Vec<&str> = REPORT_SECTIONS.iter().map(|(key, _)| *key).collect();
        for key in filtered.keys() {
            if key == "job_position" {
                continue; // header data, not a section
            }
            assert!(
                canonical.contains(&key.as_str()),
                "unexpected non-canonical section key: {key}"
            );
        }
    }

    #[test]
    fn test_canonical_section_count_is_seven() {
        assert_eq!(REPORT_SECTIONS.len(), 7);
        let prompt = render_system_prompt();
        for (_, title) in REPORT_SECTIONS {
            assert!(prompt.contains(title), "prompt missing section: {title}");
        }
    }

    #[test]
    fn test_strip_html_fences() {
        assert_eq!(
            strip_html_fences("```html\n<html></html>\n```").trim(),
            "<html></html>"
        );
        assert_eq!(strip_html_fences("<html></html>"), "<html></html>");
        assert_eq!(
            strip_html_fences("```html\n<p>unclosed").trim(),
            "<p>unclosed"
        );
    }

    #[test]
    fn test_coerce_task_list_from_array() {
        let mut log = RunLog::default();
        let extracted = Extracted::from_value(json!([
            {"task_name": "A", "description": "a"},
            {"task_name": "B", "description": "b"}
        ]));
        let tasks = coerce_task_list(extracted, &mut log);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].task_name, "A");
    }

    #[test]
    fn test_coerce_task_list_unwraps_tasks_key() {
        let mut log = RunLog::default();
        let extracted =
            Extracted::from_value(json!({"tasks": [{"task_name": "A", "description": "a"}]}));
        let tasks = coerce_task_list(extracted, &mut log);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_coerce_task_list_rejects_unrelated_object() {
        let mut log = RunLog::default();
        let extracted = Extracted::from_value(json!({"message": "no tasks here"}));
        assert!(coerce_task_list(extracted, &mut log).is_empty());
    }

    #[test]
    fn test_coerce_task_list_skips_non_object_items() {
        let mut log = RunLog::default();
        let extracted = Extracted::from_value(json!([
            {"task_name": "A", "description": "a"},
            "stray string"
        ]));
        let tasks = coerce_task_list(extracted, &mut log);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(Stage::Describe.to_string(), "job description");
        assert_eq!(Stage::Render.to_string(), "report rendering");
    }

    #[test]
    fn test_pipeline_error_maps_transport_to_unavailable() {
        let err = PipelineError {
            stage: Stage::Verify,
            source: LlmError::Unavailable("connection refused".into()),
        };
        let app: AppError = err.into();
        assert!(matches!(app, AppError::LlmUnavailable(_)));
    }

    #[test]
    fn test_pipeline_error_maps_other_failures_to_pipeline() {
        let err = PipelineError {
            stage: Stage::Recommend,
            source: LlmError::EmptyContent,
        };
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Pipeline { stage, .. } if stage == "recommendation"));
    }
}
