//! Language-model port: the trait counseling generation flows through,
//! plus the object-safe boxed wrapper for runtime backend selection.

pub mod box_client;
pub mod client;

pub use box_client::BoxLanguageModel;
pub use client::LanguageModel;
