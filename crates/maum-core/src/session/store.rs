//! SessionStore and UserProfileStore trait definitions.
//!
//! The store is an external collaborator: a document store with CRUD plus
//! the atomic primitives the turn protocol relies on. Implementations
//! live in maum-infra. Uses native async fn in traits (RPITIT).

use maum_types::error::StoreError;
use maum_types::session::{ContextEntry, ResponseMode, Session, UserId};
use uuid::Uuid;

/// Repository trait for session persistence.
///
/// `append_entries` and `replace_context_and_summary` must be atomic:
/// concurrent turns on the same session must never lose an append or
/// interleave a partial turn (last-write-wins on the summary replace is
/// acceptable, lost appends are not).
pub trait SessionStore: Send + Sync {
    /// Persist a new session.
    fn create(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<Session, StoreError>> + Send;

    /// Get a session by id.
    fn get(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Replace an existing session record.
    fn update(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// All active sessions owned by a user, most recent first.
    fn find_active_by_user(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Session>, StoreError>> + Send;

    /// Atomically append entries to a session's context.
    ///
    /// The whole slice lands as one unit, preserving order. Rejects with
    /// `ContextCapExceeded` -- never truncates -- when the context is
    /// already at or above `cap` at call time.
    fn append_entries(
        &self,
        session_id: &Uuid,
        entries: &[ContextEntry],
        cap: usize,
    ) -> impl std::future::Future<Output = Result<Session, StoreError>> + Send;

    /// Persist the chosen free-response mode.
    fn set_response_mode(
        &self,
        session_id: &Uuid,
        mode: ResponseMode,
    ) -> impl std::future::Future<Output = Result<Session, StoreError>> + Send;

    /// Atomically replace the context array and set the rolling summary
    /// (the compaction primitive).
    fn replace_context_and_summary(
        &self,
        session_id: &Uuid,
        context: Vec<ContextEntry>,
        rolling_summary: String,
    ) -> impl std::future::Future<Output = Result<Session, StoreError>> + Send;

    /// Number of sessions owned by a user.
    fn count_by_user(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<u32, StoreError>> + Send;

    /// Final summaries of the user's most recently completed sessions,
    /// most recent first, up to `limit`.
    fn find_recent_completed_summaries(
        &self,
        user: &UserId,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<String>, StoreError>> + Send;
}

/// Optional long-term profile store, consulted only on the resume path.
///
/// Non-critical: callers treat absence and failure alike.
pub trait UserProfileStore: Send + Sync {
    /// A précis of the user's long-term patterns, if one exists.
    fn get_profile_summary(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;
}
