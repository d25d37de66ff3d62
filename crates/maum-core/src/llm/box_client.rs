//! BoxLanguageModel -- object-safe dynamic dispatch wrapper for LanguageModel.
//!
//! 1. Define an object-safe `LanguageModelDyn` trait with boxed futures
//! 2. Blanket-impl `LanguageModelDyn` for all `T: LanguageModel`
//! 3. `BoxLanguageModel` wraps `Box<dyn LanguageModelDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use maum_types::llm::{GuidedOptions, LlmError, OptionPhase};
use maum_types::session::{CounselorType, ResponseMode};

use super::client::{LanguageModel, ReplyStream};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LlmError>> + Send + 'a>>;

/// Object-safe version of [`LanguageModel`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch; a blanket
/// implementation is provided for all types implementing `LanguageModel`.
pub trait LanguageModelDyn: Send + Sync {
    fn generate_options_boxed<'a>(
        &'a self,
        context: &'a [String],
        phase: OptionPhase,
        category: &'a str,
        counselor_type: CounselorType,
    ) -> BoxFuture<'a, GuidedOptions>;

    fn generate_response_boxed<'a>(
        &'a self,
        context: &'a [String],
        mode: ResponseMode,
        user_message: Option<&'a str>,
        counselor_type: CounselorType,
    ) -> BoxFuture<'a, String>;

    fn generate_response_stream_boxed(
        &self,
        context: Vec<String>,
        mode: ResponseMode,
        user_message: Option<String>,
        counselor_type: CounselorType,
    ) -> ReplyStream;

    fn generate_empathy_comment_boxed<'a>(
        &'a self,
        selection: &'a str,
        context: &'a [String],
    ) -> BoxFuture<'a, String>;

    fn generate_counselor_feedback_boxed<'a>(
        &'a self,
        selection: &'a str,
        context: &'a [String],
        counselor_type: CounselorType,
    ) -> BoxFuture<'a, String>;

    fn summarize_session_boxed<'a>(&'a self, context: &'a [String]) -> BoxFuture<'a, String>;

    fn summarize_imported_text_boxed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, String>;

    fn summarize_context_for_stuck_boxed<'a>(
        &'a self,
        context: &'a [String],
    ) -> BoxFuture<'a, String>;

    fn generate_rolling_summary_boxed<'a>(
        &'a self,
        existing: Option<&'a str>,
        entries: &'a [String],
    ) -> BoxFuture<'a, String>;
}

/// Blanket implementation: any `LanguageModel` automatically implements
/// `LanguageModelDyn`.
impl<T: LanguageModel> LanguageModelDyn for T {
    fn generate_options_boxed<'a>(
        &'a self,
        context: &'a [String],
        phase: OptionPhase,
        category: &'a str,
        counselor_type: CounselorType,
    ) -> BoxFuture<'a, GuidedOptions> {
        Box::pin(self.generate_options(context, phase, category, counselor_type))
    }

    fn generate_response_boxed<'a>(
        &'a self,
        context: &'a [String],
        mode: ResponseMode,
        user_message: Option<&'a str>,
        counselor_type: CounselorType,
    ) -> BoxFuture<'a, String> {
        Box::pin(self.generate_response(context, mode, user_message, counselor_type))
    }

    fn generate_response_stream_boxed(
        &self,
        context: Vec<String>,
        mode: ResponseMode,
        user_message: Option<String>,
        counselor_type: CounselorType,
    ) -> ReplyStream {
        self.generate_response_stream(context, mode, user_message, counselor_type)
    }

    fn generate_empathy_comment_boxed<'a>(
        &'a self,
        selection: &'a str,
        context: &'a [String],
    ) -> BoxFuture<'a, String> {
        Box::pin(self.generate_empathy_comment(selection, context))
    }

    fn generate_counselor_feedback_boxed<'a>(
        &'a self,
        selection: &'a str,
        context: &'a [String],
        counselor_type: CounselorType,
    ) -> BoxFuture<'a, String> {
        Box::pin(self.generate_counselor_feedback(selection, context, counselor_type))
    }

    fn summarize_session_boxed<'a>(&'a self, context: &'a [String]) -> BoxFuture<'a, String> {
        Box::pin(self.summarize_session(context))
    }

    fn summarize_imported_text_boxed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, String> {
        Box::pin(self.summarize_imported_text(text))
    }

    fn summarize_context_for_stuck_boxed<'a>(
        &'a self,
        context: &'a [String],
    ) -> BoxFuture<'a, String> {
        Box::pin(self.summarize_context_for_stuck(context))
    }

    fn generate_rolling_summary_boxed<'a>(
        &'a self,
        existing: Option<&'a str>,
        entries: &'a [String],
    ) -> BoxFuture<'a, String> {
        Box::pin(self.generate_rolling_summary(existing, entries))
    }
}

/// Type-erased language model for runtime backend selection.
///
/// Since `LanguageModel` uses RPITIT it cannot be a trait object
/// directly; `BoxLanguageModel` provides equivalent methods delegating to
/// the inner `LanguageModelDyn` trait object.
pub struct BoxLanguageModel {
    inner: Box<dyn LanguageModelDyn + Send + Sync>,
}

impl BoxLanguageModel {
    /// Wrap a concrete `LanguageModel` in a type-erased box.
    pub fn new<T: LanguageModel + 'static>(model: T) -> Self {
        Self {
            inner: Box::new(model),
        }
    }

    pub async fn generate_options(
        &self,
        context: &[String],
        phase: OptionPhase,
        category: &str,
        counselor_type: CounselorType,
    ) -> Result<GuidedOptions, LlmError> {
        self.inner
            .generate_options_boxed(context, phase, category, counselor_type)
            .await
    }

    pub async fn generate_response(
        &self,
        context: &[String],
        mode: ResponseMode,
        user_message: Option<&str>,
        counselor_type: CounselorType,
    ) -> Result<String, LlmError> {
        self.inner
            .generate_response_boxed(context, mode, user_message, counselor_type)
            .await
    }

    pub fn generate_response_stream(
        &self,
        context: Vec<String>,
        mode: ResponseMode,
        user_message: Option<String>,
        counselor_type: CounselorType,
    ) -> ReplyStream {
        self.inner
            .generate_response_stream_boxed(context, mode, user_message, counselor_type)
    }

    pub async fn generate_empathy_comment(
        &self,
        selection: &str,
        context: &[String],
    ) -> Result<String, LlmError> {
        self.inner
            .generate_empathy_comment_boxed(selection, context)
            .await
    }

    pub async fn generate_counselor_feedback(
        &self,
        selection: &str,
        context: &[String],
        counselor_type: CounselorType,
    ) -> Result<String, LlmError> {
        self.inner
            .generate_counselor_feedback_boxed(selection, context, counselor_type)
            .await
    }

    pub async fn summarize_session(&self, context: &[String]) -> Result<String, LlmError> {
        self.inner.summarize_session_boxed(context).await
    }

    pub async fn summarize_imported_text(&self, text: &str) -> Result<String, LlmError> {
        self.inner.summarize_imported_text_boxed(text).await
    }

    pub async fn summarize_context_for_stuck(
        &self,
        context: &[String],
    ) -> Result<String, LlmError> {
        self.inner.summarize_context_for_stuck_boxed(context).await
    }

    pub async fn generate_rolling_summary(
        &self,
        existing: Option<&str>,
        entries: &[String],
    ) -> Result<String, LlmError> {
        self.inner
            .generate_rolling_summary_boxed(existing, entries)
            .await
    }
}
