//! LanguageModel trait definition.
//!
//! This is the boundary between the conversation engine and whatever
//! model backend the surrounding system wires in. Uses RPITIT for the
//! request/response calls and `Pin<Box<dyn Stream>>` for the streaming
//! reply (streams need to be object-safe for the BoxLanguageModel
//! wrapper).

use std::pin::Pin;

use futures_util::Stream;

use maum_types::llm::{GuidedOptions, LlmError, OptionPhase};
use maum_types::session::{CounselorType, ResponseMode};

/// A stream of free-response text chunks.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Trait for language-model backends.
///
/// `context` is the rendered flat transcript (rolling summary line first
/// when one exists), in replay order. All calls are request/response
/// except `generate_response_stream`; failures propagate as `LlmError`
/// except where the caller explicitly treats the call as best-effort
/// (rolling summarization).
///
/// Implementations live outside this crate; tests use scripted mocks.
pub trait LanguageModel: Send + Sync {
    /// Generate the next guided question and its selectable options.
    fn generate_options(
        &self,
        context: &[String],
        phase: OptionPhase,
        category: &str,
        counselor_type: CounselorType,
    ) -> impl std::future::Future<Output = Result<GuidedOptions, LlmError>> + Send;

    /// Generate the counselor's free-response reply.
    fn generate_response(
        &self,
        context: &[String],
        mode: ResponseMode,
        user_message: Option<&str>,
        counselor_type: CounselorType,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// Streaming variant of `generate_response`. Chunks arrive in order;
    /// the stream ends after the last chunk or with an error item.
    ///
    /// Takes owned arguments because the stream outlives the call.
    fn generate_response_stream(
        &self,
        context: Vec<String>,
        mode: ResponseMode,
        user_message: Option<String>,
        counselor_type: CounselorType,
    ) -> ReplyStream;

    /// One-line empathetic acknowledgment of a guided-option selection.
    fn generate_empathy_comment(
        &self,
        selection: &str,
        context: &[String],
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// Short counselor-style feedback comment on a selection.
    fn generate_counselor_feedback(
        &self,
        selection: &str,
        context: &[String],
        counselor_type: CounselorType,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// One-line summary of a full session transcript (for completion).
    fn summarize_session(
        &self,
        context: &[String],
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// Condense bulk-imported prior-conversation text into a short note.
    fn summarize_imported_text(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// Digestible recap of everything gathered so far, for the user who
    /// cannot find the words to continue.
    fn summarize_context_for_stuck(
        &self,
        context: &[String],
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// Merge older transcript lines with the existing rolling summary
    /// into a new condensed summary.
    fn generate_rolling_summary(
        &self,
        existing: Option<&str>,
        entries: &[String],
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
