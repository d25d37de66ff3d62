//! Usage-quota policy for session creation.

pub mod usage;

pub use usage::UsagePolicy;
