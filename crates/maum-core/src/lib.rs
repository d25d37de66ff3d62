//! Conversation orchestration logic and port trait definitions for Maum.
//!
//! This crate defines the "ports" (store and language-model traits) that
//! the infrastructure layer implements. It depends only on `maum-types` --
//! never on `maum-infra` or any database/IO crate.

pub mod chat;
pub mod crisis;
pub mod llm;
pub mod policy;
pub mod session;
