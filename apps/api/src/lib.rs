//! SkillPulse: LLM-backed job-transformation and career-advice services.
//!
//! Two binaries share this library:
//! - `transform-api` runs the six-stage analysis pipeline behind
//!   `POST /analyze-job`.
//! - `advice-api` serves the single-call career endpoints backed by user
//!   profiles in PostgreSQL.
//!
//! The interesting machinery lives in [`extract`] (layered JSON recovery
//! from non-deterministic model output) and [`transform::pipeline`] (the
//! fixed stage sequence with degrade-vs-abort failure handling).

pub mod advice;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod llm_client;
pub mod routes;
pub mod state;
pub mod transform;
