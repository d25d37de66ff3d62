//! In-memory user profile store.
//!
//! Implements the optional `UserProfileStore` port: a précis of long-term
//! user patterns keyed by user id, seeded at construction.

use dashmap::DashMap;

use maum_core::session::store::UserProfileStore;
use maum_types::error::StoreError;
use maum_types::session::UserId;

/// In-memory implementation of `UserProfileStore`.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<UserId, String>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a user's profile summary.
    pub fn put(&self, user: UserId, summary: impl Into<String>) {
        self.profiles.insert(user, summary.into());
    }
}

impl UserProfileStore for InMemoryProfileStore {
    async fn get_profile_summary(&self, user: &UserId) -> Result<Option<String>, StoreError> {
        Ok(self.profiles.get(user).map(|s| s.clone()))
    }
}
