//! Session lifecycle: creation, completion, resumption, and rolling
//! summarization.
//!
//! `SessionLifecycle` owns the context-array invariants: append-only while
//! active, hard-capped, and compacted back down to the most recent entries
//! once the rolling-summarization threshold is crossed. Generic over
//! `SessionStore` (maum-core never depends on maum-infra).

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use maum_types::config::ChatConfig;
use maum_types::error::{ChatError, StoreError};
use maum_types::session::{
    ContextEntry, CounselorType, DIRECT_CATEGORY, EntryTag, ResponseMode, Session, SessionStatus,
    UserId,
};

use crate::llm::BoxLanguageModel;
use crate::session::store::SessionStore;

/// Creates, mutates, completes, and resumes sessions.
pub struct SessionLifecycle<S: SessionStore> {
    store: S,
    llm: Arc<BoxLanguageModel>,
    config: ChatConfig,
}

impl<S: SessionStore> SessionLifecycle<S> {
    pub fn new(store: S, llm: Arc<BoxLanguageModel>, config: ChatConfig) -> Self {
        Self { store, llm, config }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Create a new active session, seeded with one entry recording the
    /// category. Category defaults to `"direct"` when none is given.
    pub async fn create(
        &self,
        user_id: UserId,
        category: Option<String>,
        counselor_type: Option<CounselorType>,
    ) -> Result<Session, StoreError> {
        let category = category.unwrap_or_else(|| DIRECT_CATEGORY.to_string());
        let now = Utc::now();
        let session = Session {
            id: Uuid::now_v7(),
            user_id,
            counselor_type: counselor_type.unwrap_or_default(),
            response_mode: None,
            context: vec![ContextEntry::system(EntryTag::Category, category.clone())],
            rolling_summary: None,
            summary: None,
            status: SessionStatus::Active,
            is_saved: false,
            saved_name: None,
            alias: None,
            created_at: now,
            updated_at: now,
            category,
        };

        let session = self.store.create(&session).await?;
        info!(session_id = %session.id, category = %session.category, "Session created");
        Ok(session)
    }

    /// Get a session by id; absence is a hard not-found.
    pub async fn find_by_id(&self, session_id: &Uuid) -> Result<Session, StoreError> {
        self.store
            .get(session_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Atomically append entries, enforcing the configured context cap.
    pub async fn append(
        &self,
        session_id: &Uuid,
        entries: &[ContextEntry],
    ) -> Result<Session, StoreError> {
        self.store
            .append_entries(session_id, entries, self.config.context_cap)
            .await
    }

    /// Persist the free-response style chosen for this session.
    pub async fn set_response_mode(
        &self,
        session_id: &Uuid,
        mode: ResponseMode,
    ) -> Result<Session, StoreError> {
        self.store.set_response_mode(session_id, mode).await
    }

    /// Complete a session: generate the one-line final summary from the
    /// full transcript, mark it completed, and clear the context array.
    ///
    /// Clearing the context discards the detailed transcript, keeping
    /// only the generated summary. This mirrors the long-standing service
    /// behavior; `resume` therefore restarts from the rolling summary and
    /// the final summary alone.
    ///
    /// Completing an already-completed session is a no-op returning the
    /// session as-is; re-summarizing the cleared transcript would
    /// overwrite the archived summary.
    pub async fn complete(&self, session_id: &Uuid) -> Result<Session, ChatError> {
        let mut session = self.find_by_id(session_id).await?;

        if session.status == SessionStatus::Completed {
            return Ok(session);
        }

        let summary = self.llm.summarize_session(&session.render_context()).await?;

        session.summary = Some(summary);
        session.status = SessionStatus::Completed;
        session.context.clear();
        session.updated_at = Utc::now();
        self.store.update(&session).await?;

        info!(session_id = %session.id, "Session completed");
        Ok(session)
    }

    /// Flip a completed session back to active. `summary` and
    /// `rolling_summary` are left untouched.
    pub async fn resume(&self, session_id: &Uuid) -> Result<Session, StoreError> {
        let mut session = self.find_by_id(session_id).await?;

        if session.status == SessionStatus::Completed {
            session.status = SessionStatus::Active;
            session.updated_at = Utc::now();
            self.store.update(&session).await?;
            info!(session_id = %session.id, "Session resumed");
        }

        Ok(session)
    }

    /// Run rolling summarization if the context has crossed the
    /// threshold: merge all but the most recent entries with the existing
    /// rolling summary into a new condensed summary, then atomically
    /// replace the context with just the recent tail.
    ///
    /// Best-effort: the enclosing turn must still succeed when this
    /// fails, so model and store errors are logged and swallowed. Runs
    /// synchronously within the turn, so the compacted-length invariant
    /// holds by the time the turn's response is returned.
    pub async fn maybe_compact(&self, session: &Session) {
        if session.context.len() < self.config.compaction_threshold {
            return;
        }

        let split = session.context.len() - self.config.keep_recent;
        let (to_compact, to_keep) = session.context.split_at(split);
        let lines: Vec<String> = to_compact.iter().map(ContextEntry::render).collect();

        let merged = match self
            .llm
            .generate_rolling_summary(session.rolling_summary.as_deref(), &lines)
            .await
        {
            Ok(summary) => summary,
            Err(err) => {
                warn!(session_id = %session.id, error = %err, "Rolling summarization failed; continuing uncompacted");
                return;
            }
        };

        if let Err(err) = self
            .store
            .replace_context_and_summary(&session.id, to_keep.to_vec(), merged)
            .await
        {
            warn!(session_id = %session.id, error = %err, "Failed to store rolling summary; continuing uncompacted");
            return;
        }

        info!(
            session_id = %session.id,
            compacted = to_compact.len(),
            kept = to_keep.len(),
            "Context compacted into rolling summary"
        );
    }
}
