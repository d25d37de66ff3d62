//! Shared domain types for the Maum counseling session engine.
//!
//! Pure data: sessions, context entries, crisis assessments, quota
//! decisions, configuration, and the error taxonomy. No IO, no async.

pub mod config;
pub mod crisis;
pub mod error;
pub mod llm;
pub mod quota;
pub mod session;
