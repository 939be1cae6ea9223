//! Career-advice service: single-call LLM endpoints around user profiles,
//! skills, and trends, with best-effort persistence of the results.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod queries;
