//! The per-turn conversation protocol.

pub mod orchestrator;
pub mod result;

pub use orchestrator::ConversationOrchestrator;
pub use result::{
    GenerateResponseResult, SelectOptionResult, StartSessionRequest, StartSessionResult,
};
