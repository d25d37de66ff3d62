//! Language-model request/response shapes for the Maum core.
//!
//! The core never talks to a provider directly; these types cross the
//! `LanguageModel` port defined in maum-core.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Phase marker for guided-option generation.
///
/// `Initial` is the very first question of a session with no user input
/// yet; `Collecting` is every subsequent round of context gathering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionPhase {
    Initial,
    Collecting,
}

impl fmt::Display for OptionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionPhase::Initial => write!(f, "initial"),
            OptionPhase::Collecting => write!(f, "collecting"),
        }
    }
}

/// A guided-phase question with its selectable options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidedOptions {
    pub question: String,
    pub options: Vec<String>,
    /// Model signals enough context has been gathered for free response.
    pub can_proceed_to_response: bool,
    /// Model signals a counselor-feedback comment would be meaningful.
    pub can_request_feedback: bool,
}

/// Errors from language-model operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
