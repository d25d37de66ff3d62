//! Session persistence ports and lifecycle management.

pub mod lifecycle;
pub mod store;

pub use lifecycle::SessionLifecycle;
pub use store::{SessionStore, UserProfileStore};
