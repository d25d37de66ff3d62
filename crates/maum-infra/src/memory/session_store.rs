//! In-memory session store.
//!
//! Implements `SessionStore` from `maum-core` over a `DashMap`. Each
//! mutation is a read-modify-write under the map's per-entry lock, which
//! gives the append/replace atomicity the port contract requires:
//! concurrent turns on the same session cannot lose an append, and the
//! cap check and the append see the same context length.

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use maum_core::session::store::SessionStore;
use maum_types::error::StoreError;
use maum_types::session::{ContextEntry, ResponseMode, Session, SessionStatus, UserId};

/// In-memory implementation of `SessionStore`.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> Result<Session, StoreError> {
        if self.sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict(format!(
                "session {} already exists",
                session.id
            )));
        }
        self.sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(session_id).map(|s| s.clone()))
    }

    async fn update(&self, session: &Session) -> Result<(), StoreError> {
        match self.sessions.get_mut(&session.id) {
            Some(mut slot) => {
                *slot = session.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn find_active_by_user(&self, user: &UserId) -> Result<Vec<Session>, StoreError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| s.user_id == *user && s.status == SessionStatus::Active)
            .map(|s| s.clone())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn append_entries(
        &self,
        session_id: &Uuid,
        entries: &[ContextEntry],
        cap: usize,
    ) -> Result<Session, StoreError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or(StoreError::NotFound)?;

        if session.context.len() >= cap {
            return Err(StoreError::ContextCapExceeded {
                len: session.context.len(),
                cap,
            });
        }

        session.context.extend_from_slice(entries);
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    async fn set_response_mode(
        &self,
        session_id: &Uuid,
        mode: ResponseMode,
    ) -> Result<Session, StoreError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or(StoreError::NotFound)?;
        session.response_mode = Some(mode);
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    async fn replace_context_and_summary(
        &self,
        session_id: &Uuid,
        context: Vec<ContextEntry>,
        rolling_summary: String,
    ) -> Result<Session, StoreError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or(StoreError::NotFound)?;
        session.context = context;
        session.rolling_summary = Some(rolling_summary);
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    async fn count_by_user(&self, user: &UserId) -> Result<u32, StoreError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.user_id == *user)
            .count() as u32)
    }

    async fn find_recent_completed_summaries(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let mut completed: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| {
                s.user_id == *user && s.status == SessionStatus::Completed && s.summary.is_some()
            })
            .map(|s| s.clone())
            .collect();
        completed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(completed
            .into_iter()
            .take(limit)
            .filter_map(|s| s.summary)
            .collect())
    }
}
