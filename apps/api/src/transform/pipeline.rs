//! Pipeline orchestrator: the fixed six-stage sequence behind /analyze-job.
//!
//! Flow: describe_job → extract_tasks → verify → categorize_automation →
//!       recommend → render_report → assembled JobAnalysis.
//!
//! No branching, no loops, no inter-stage retries. Each stage's prompt
//! depends on the previous stage's output, so execution is strictly
//! sequential; each run owns all of its data and shares nothing with
//! concurrent runs.

use crate::llm_client::ChatApi;
use crate::transform::models::{
    AutomationAssessment, JobAnalysis, ReportPayload, Task, TaskAnalysisRow, VerificationInfo,
    humanize_category,
};
use crate::transform::stages::{
    categorize_automation, describe_job, extract_tasks, recommend, render_report, verify,
    PipelineError,
};

/// Per-run log buffer. Lines mirror to `tracing` and are returned to the
/// caller as the `backend_logs` field, matching what the frontend expects to
/// display alongside the report.
#[derive(Debug, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.lines.push(format!("[INFO] {message}"));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.lines.push(format!("[WARN] {message}"));
    }

    pub fn into_string(self) -> String {
        self.lines.join("\n")
    }
}

/// Builds the task-analysis summary, positionally aligning assessments to
/// the validated task list. The summary always has exactly one row per task;
/// a task with no matching assessment gets an N/A placeholder row, and
/// assessments beyond the task count have no task to attach to and are
/// dropped.
pub fn build_task_summary(
    tasks: &[Task],
    analysis: &[AutomationAssessment],
) -> Vec<TaskAnalysisRow> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let task_name = if task.task_name.is_empty() {
                "N/A".to_string()
            } else {
                task.task_name.clone()
            };
            match analysis.get(i) {
                Some(assessment) => TaskAnalysisRow {
                    task_name,
                    ai_involvement_percentage: assessment.ai_involvement_percentage,
                    time_saved_percentage: assessment.time_saved_percentage,
                    automation_category: humanize_category(&assessment.automation_category),
                    ai_technologies: assessment.ai_technologies.clone(),
                    explanation: assessment.explanation.clone(),
                },
                None => TaskAnalysisRow {
                    task_name,
                    ai_involvement_percentage: None,
                    time_saved_percentage: None,
                    automation_category: "N/A".to_string(),
                    ai_technologies: Vec::new(),
                    explanation: String::new(),
                },
            }
        })
        .collect()
}

/// Runs the complete analysis for one job title.
///
/// Transport failures abort with the failing stage's identity; parse
/// failures have already degraded to typed defaults inside the stages, so a
/// returned `JobAnalysis` always carries `status == "success"` even when
/// some sections are empty.
pub async fn analyze_job(
    chat: &dyn ChatApi,
    job_position: &str,
) -> Result<JobAnalysis, PipelineError> {
    let mut log = RunLog::default();
    log.info(format!(
        "Starting AI transformation analysis for: {job_position}"
    ));

    // Stage 1: describe the role.
    let job_description = describe_job(chat, job_position, &mut log).await?;

    // Stage 2: pull individual tasks out of the description.
    let extracted_tasks = extract_tasks(chat, &job_description, &mut log).await?;

    // Stage 3: verification. Revised data wins only when present and
    // non-empty; otherwise the pre-verification values are retained.
    let verification = verify(chat, &job_description, &extracted_tasks, &mut log).await?;
    if verification.is_modified() {
        log.info(format!(
            "Verification made corrections: {:?}",
            verification.corrections_made
        ));
    } else {
        log.info("Verification approved the data without modifications");
    }
    let (validated_job_description, validated_tasks) =
        verification.validated_or(job_description, extracted_tasks);

    // Stage 4: automation potential per validated task.
    let automation = categorize_automation(chat, &validated_tasks, &mut log).await?;
    let task_analysis_summary =
        build_task_summary(&validated_tasks, &automation.automation_analysis);

    // Stage 5: strategic recommendations.
    let recommendations = recommend(
        chat,
        &validated_job_description,
        &automation.automation_analysis,
        &mut log,
    )
    .await?;

    let verification_info = VerificationInfo {
        status: verification.verification_status.clone(),
        corrections: verification.corrections_made.clone(),
    };

    // Stage 6: render, from a payload stripped of empty sections.
    let payload = ReportPayload {
        job_position: job_position.to_string(),
        job_description: validated_job_description.clone(),
        extracted_tasks: validated_tasks.clone(),
        task_analysis_summary: task_analysis_summary.clone(),
        overall_metrics: automation.overall_metrics.clone(),
        verification_info: verification_info.clone(),
        future_skill_recommendations: recommendations.future_skill_recommendations.clone(),
        sustainability_plan: recommendations.sustainability_plan.clone(),
        opportunities_identification: recommendations.opportunities_identification.clone(),
    };
    let html_report = render_report(chat, &payload, &mut log).await?;

    Ok(JobAnalysis {
        job_position: job_position.to_string(),
        job_description: validated_job_description,
        extracted_tasks: validated_tasks,
        automation_categorization: automation.clone(),
        overall_metrics: automation.overall_metrics,
        verification_info,
        future_skill_recommendations: recommendations.future_skill_recommendations,
        sustainability_plan: recommendations.sustainability_plan,
        opportunities_identification: recommendations.opportunities_identification,
        task_analysis_summary,
        html_report,
        status: "success".to_string(),
        backend_logs: log.into_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
