//! In-memory store implementations.

pub mod profile_store;
pub mod session_store;

pub use profile_store::InMemoryProfileStore;
pub use session_store::InMemorySessionStore;
