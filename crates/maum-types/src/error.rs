//! Error taxonomy for the Maum core.
//!
//! `ChatError` is the user-facing taxonomy of a conversation turn;
//! `StoreError` is what the session-store port reports. Validation and
//! quota rejections carry specific human-readable reasons, never a
//! generic failure.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors from session-store operations (used by the port trait in
/// maum-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("session not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("context cap exceeded: {len} entries, cap {cap}")]
    ContextCapExceeded { len: usize, cap: usize },
}

/// Errors from conversation-turn operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Client-fixable input problem; rejected before any state mutation.
    #[error("{0}")]
    Validation(String),

    #[error("session not found")]
    NotFound,

    /// Ownership mismatch on a session.
    #[error("access denied")]
    AccessDenied,

    /// Session-limit reached. Carries structured data for the client's
    /// upgrade prompt; distinct from a generic failure.
    #[error("session limit reached ({session_count}/{limit})")]
    QuotaExceeded { session_count: u32, limit: u32 },

    /// Language model or store failure on the main generation path.
    /// Nothing is committed when this is raised.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<LlmError> for ChatError {
    fn from(err: LlmError) -> Self {
        ChatError::Upstream(err.to_string())
    }
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ChatError::NotFound,
            StoreError::ContextCapExceeded { len, cap } => ChatError::Validation(format!(
                "대화 내용이 너무 많아요 ({len}/{cap}). 세션을 마무리하고 새로 시작해 주세요."
            )),
            other => ChatError::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_error_carries_counts() {
        let err = ChatError::QuotaExceeded {
            session_count: 3,
            limit: 3,
        };
        assert_eq!(err.to_string(), "session limit reached (3/3)");
    }

    #[test]
    fn test_store_not_found_maps_to_chat_not_found() {
        let err: ChatError = StoreError::NotFound.into();
        assert!(matches!(err, ChatError::NotFound));
    }

    #[test]
    fn test_cap_exceeded_maps_to_validation() {
        let err: ChatError = StoreError::ContextCapExceeded { len: 200, cap: 200 }.into();
        assert!(matches!(err, ChatError::Validation(_)));
    }

    #[test]
    fn test_llm_error_maps_to_upstream() {
        let err: ChatError = LlmError::Stream("cut".to_string()).into();
        assert!(matches!(err, ChatError::Upstream(_)));
    }
}
