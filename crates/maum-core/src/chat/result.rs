//! Request/result payloads for the conversation orchestrator.
//!
//! These are the shapes the thin request-handling layer serializes to the
//! client; crisis redirection is a successful outcome here, never an
//! error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use maum_types::crisis::CrisisLevel;
use maum_types::quota::UserAccount;
use maum_types::session::{CounselorType, ResponseMode};

/// Input to `start_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub user: UserAccount,
    /// Topic tag; defaults to `"direct"` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counselor_type: Option<CounselorType>,
    /// Marks `initial_text` as bulk-pasted prior-conversation text,
    /// raising the length cap and routing it through import
    /// summarization.
    #[serde(default)]
    pub is_import: bool,
    /// Pre-approved condensed note for an import; skips summarization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_summary: Option<String>,
}

impl StartSessionRequest {
    /// Bare session start with no initial input.
    pub fn new(user: UserAccount, category: Option<String>) -> Self {
        Self {
            user,
            category,
            initial_text: None,
            counselor_type: None,
            is_import: false,
            import_summary: None,
        }
    }
}

/// Outcome of `start_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResult {
    pub session_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub can_proceed_to_response: bool,
    pub context_count: usize,
    pub has_history: bool,
    /// Most recent prior-session summary, for client display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_session_summary: Option<String>,
}

/// Outcome of `select_option`.
///
/// Exactly one of three shapes: crisis short-circuit (`is_crisis`, modes
/// exposed), stuck recap (`context_summary` plus fresh options), or the
/// normal next guided round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOptionResult {
    pub is_crisis: bool,
    pub crisis_level: CrisisLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empathy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub options: Vec<String>,
    pub can_proceed_to_response: bool,
    /// Free-response styles offered once the session may leave the
    /// guided phase (always exposed on crisis).
    pub response_modes: Vec<ResponseMode>,
    pub context_count: usize,
}

/// Outcome of `generate_response` (and `set_mode`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponseResult {
    pub reply: String,
    pub is_crisis: bool,
    pub crisis_level: CrisisLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
    pub context_count: usize,
}
