//! Configuration for the Maum conversation engine.
//!
//! `ChatConfig` holds every quota and cap constant. It is injected at
//! construction of the orchestrator, lifecycle, and policy components,
//! never read from ambient global state mid-operation. All fields have
//! defaults so an empty TOML table is a valid config.

use serde::{Deserialize, Serialize};

/// Caps and quota constants for the conversation engine.
///
/// Character caps count Unicode scalar values (`chars().count()`), not
/// bytes; the transcripts are Korean. Entry caps count context entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Hard cap on context entries during the guided phase.
    #[serde(default = "default_context_cap")]
    pub context_cap: usize,

    /// Cap on user-role entries during free chat. Counted on a different
    /// base than `context_cap`: user entries only, not raw length.
    #[serde(default = "default_free_chat_cap")]
    pub free_chat_cap: usize,

    /// Context length at which rolling summarization triggers.
    #[serde(default = "default_compaction_threshold")]
    pub compaction_threshold: usize,

    /// Entries kept verbatim after a compaction pass.
    #[serde(default = "default_keep_recent")]
    pub keep_recent: usize,

    /// Character cap for plain user input.
    #[serde(default = "default_input_char_cap")]
    pub input_char_cap: usize,

    /// Character cap for bulk-imported prior-conversation text.
    #[serde(default = "default_import_char_cap")]
    pub import_char_cap: usize,

    /// Sessions a non-subscribed, non-grandfathered user may own.
    #[serde(default = "default_base_free_limit")]
    pub base_free_limit: u32,

    /// Prior completed-session summaries folded in on session start.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_context_cap() -> usize {
    200
}

fn default_free_chat_cap() -> usize {
    100
}

fn default_compaction_threshold() -> usize {
    20
}

fn default_keep_recent() -> usize {
    10
}

fn default_input_char_cap() -> usize {
    500
}

fn default_import_char_cap() -> usize {
    100_000
}

fn default_base_free_limit() -> u32 {
    3
}

fn default_history_limit() -> usize {
    3
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_cap: default_context_cap(),
            free_chat_cap: default_free_chat_cap(),
            compaction_threshold: default_compaction_threshold(),
            keep_recent: default_keep_recent(),
            input_char_cap: default_input_char_cap(),
            import_char_cap: default_import_char_cap(),
            base_free_limit: default_base_free_limit(),
            history_limit: default_history_limit(),
        }
    }
}
