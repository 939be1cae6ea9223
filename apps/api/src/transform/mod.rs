//! Job-transformation service core: the six-stage LLM pipeline, its typed
//! payloads, the input guard, and the /analyze-job handler.

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod stages;
pub mod validate;
