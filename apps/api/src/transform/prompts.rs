//! LLM prompt constants for the six transformation stages.
//!
//! System prompts pin each stage's role and exact output schema; user-prompt
//! templates carry the previous stage's serialized output. Replace the
//! `{placeholder}` markers before sending.

/// Stage 1 system prompt: job describer. JSON object only.
pub const JOB_DESCRIBER_SYSTEM: &str = r#"You are an expert in job analysis and description, specializing in IT roles.

CRITICAL: You must ONLY respond with valid JSON. No other text, no explanations, just pure JSON.

When given a job title, respond with this exact JSON structure:
{
    "job_title": "The job title provided",
    "Description": "Brief 1-2 sentence overview of the role",
    "key_responsibilities": [
        {"responsibility": "Core responsibility 1", "importance": "High"},
        {"responsibility": "Core responsibility 2", "importance": "High"},
        {"responsibility": "Core responsibility 3", "importance": "Medium"}
    ],
    "essential_requirements": [
        "Key requirement 1",
        "Key requirement 2",
        "Key requirement 3"
    ]
}

Remember: ONLY output valid JSON, nothing else. Start with { and end with }."#;

/// Stage 2 system prompt: task extractor. JSON array only.
pub const TASK_EXTRACTOR_SYSTEM: &str = r#"You are an expert in task extraction from job descriptions.

CRITICAL: You must ONLY respond with valid JSON array. No other text, no explanations, just pure JSON.

When given a job description, respond with this exact JSON structure:
[
    {"task_name": "Task 1", "description": "Detailed description of task 1"},
    {"task_name": "Task 2", "description": "Detailed description of task 2"},
    {"task_name": "Task 3", "description": "Detailed description of task 3"}
]

Remember: ONLY output valid JSON array, nothing else. Start with [ and end with ]."#;

/// Stage 2 user-prompt template. Replace `{job_description}`.
pub const TASK_EXTRACTOR_PROMPT_TEMPLATE: &str =
    "Extract all tasks from this job description:\n{job_description}";

/// Stage 3 system prompt: verification and validation.
pub const VERIFIER_SYSTEM: &str = r#"You are a quality assurance specialist for job analysis data.

CRITICAL: You must ONLY respond with valid JSON. No other text, just pure JSON.

When given job data to verify, respond with this exact JSON structure:
{
    "verification_status": "APPROVED",
    "corrections_made": [],
    "validated_job_description": {},
    "validated_tasks": []
}

If you correct anything, set "verification_status" to "MODIFIED", list every
correction in "corrections_made", and return the revised data in
"validated_job_description" and "validated_tasks".

Remember: ONLY output valid JSON, nothing else. Start with { and end with }."#;

/// Stage 3 user-prompt template. Replace `{job_description}` and `{tasks}`.
pub const VERIFIER_PROMPT_TEMPLATE: &str = r#"Please verify and validate the following job analysis data:

Job Description:
{job_description}

Extracted Tasks:
{tasks}

Review this data carefully and provide your verification results with any necessary corrections."#;

/// Stage 4 system prompt: automation categorizer.
pub const AUTOMATION_SYSTEM: &str = r#"You are an expert in AI automation analysis. Your role is to categorize job tasks based on their automation potential.

Your task is to:
1. Analyze each job task and determine if it can be:
   a) FULLY AUTOMATED by AI (90-100% automation)
   b) PARTIALLY AUTOMATED/HYBRID by AI (30-89% automation)
   c) NOT AUTOMATABLE (0-29% automation)
2. Provide a detailed explanation for each categorization.
3. Estimate the percentage of AI involvement for each task.
4. Calculate the potential time saved through AI automation.
5. Identify which AI technologies could be used (e.g., LLMs, Computer Vision, RPA, etc.).

IMPORTANT: Your output MUST ALWAYS be formatted as a valid JSON object.
The output should follow this exact structure:

```json
{
    "automation_analysis": [
        {
            "task": "Task description",
            "automation_category": "FULLY_AUTOMATED",
            "ai_involvement_percentage": 100,
            "time_saved_percentage": 80,
            "ai_technologies": ["LLMs", "Code Generation"],
            "explanation": "Detailed explanation of why this task can be fully automated and the expected impact."
        }
    ],
    "overall_metrics": {
        "average_automation_percentage": 65,
        "estimated_time_savings": "40-50% overall time reduction",
        "automation_readiness": "High/Medium/Low"
    }
}
```"#;

/// Stage 4 user-prompt template. Replace `{tasks}`.
pub const AUTOMATION_PROMPT_TEMPLATE: &str = r#"Analyze the following tasks and determine their AI automation potential, including time savings and AI technologies:

{tasks}"#;

/// Stage 5 system prompt: strategic recommendations.
pub const RECOMMENDATION_SYSTEM: &str = r#"You are an expert in generating strategic recommendations for AI transformation in IT roles. Your role is to provide actionable plans for future skills, workforce sustainability, and new opportunities.

Your response MUST be a JSON object containing three keys: `future_skill_recommendations`, `sustainability_plan`, and `opportunities_identification`.

- **`future_skill_recommendations`**: (List of objects) Detail the skills needed for the AI-enhanced role. Each object should have `skill_area`, `specific_skills`, and `relevance_to_ai_role`.
- **`sustainability_plan`**: (List of objects) Based on the definition of workforce sustainability (maintaining a resilient, adaptable, and equitable workforce amid AI disruptions), provide initiatives. Each object should have `area`, `initiative`, and `impact_metric`.
- **`opportunities_identification`**: (List of objects) Identify new business opportunities created by AI adoption. Each object should have `opportunity`, `description`, and `potential_value_proposition`.

Example structure:
```json
{
    "future_skill_recommendations": [
        {
            "skill_area": "Data Literacy and Analysis",
            "specific_skills": ["Understanding AI model outputs", "Data-driven decision making"],
            "relevance_to_ai_role": "Essential for interpreting AI insights and making informed decisions."
        }
    ],
    "sustainability_plan": [
        {
            "area": "Continuous Learning and Upskilling",
            "initiative": "Develop personalized learning paths for employees to acquire critical AI-related skills.",
            "impact_metric": "Increased employee retention by 25% and internal mobility opportunities."
        }
    ],
    "opportunities_identification": [
        {
            "opportunity": "Personalized Customer Experience at Scale",
            "description": "Leverage AI to analyze customer data and provide highly personalized recommendations.",
            "potential_value_proposition": "Increased customer retention by 15% and 20% revenue growth."
        }
    ]
}
```"#;

/// Stage 5 user-prompt template. Replace `{job_title}` and `{automation_analysis}`.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Generate recommendations for the AI transformation of a '{job_title}' role.

Here is the analysis of tasks and their automation potential:
{automation_analysis}

Based on this, provide recommendations for future skills, a workforce sustainability plan, and new opportunities."#;

/// Stage 6 user-prompt template. Replace `{report_data}` with the filtered
/// report payload. The system prompt is built from the canonical section
/// list; see `stages::render_system_prompt`.
pub const RENDER_PROMPT_TEMPLATE: &str =
    "Generate a comprehensive HTML report based on the following data:\n{report_data}";
