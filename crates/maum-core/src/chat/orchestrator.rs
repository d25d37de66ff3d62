//! Conversation orchestrator: the per-turn protocol core.
//!
//! Drives a counseling session turn by turn: validates input, checks the
//! usage quota, runs crisis detection, negotiates guided options vs.
//! free-response mode with the language model, and updates session state.
//! Stateless between calls -- all session state lives in the store.
//!
//! Failure semantics: validation and quota checks run before any context
//! mutation, and generation runs before any append, so a failed turn
//! commits nothing. The crisis short-circuit paths append their flagged
//! entry and canned response together as one atomic unit.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::warn;
use uuid::Uuid;

use maum_types::config::ChatConfig;
use maum_types::crisis::{CrisisAssessment, CrisisLevel};
use maum_types::error::ChatError;
use maum_types::llm::OptionPhase;
use maum_types::session::{
    ContextEntry, EntryRole, EntryTag, ResponseMode, Session, SessionStatus, UserId,
};

use crate::crisis::CrisisDetector;
use crate::llm::BoxLanguageModel;
use crate::policy::UsagePolicy;
use crate::session::store::{SessionStore, UserProfileStore};
use crate::session::SessionLifecycle;

use super::result::{
    GenerateResponseResult, SelectOptionResult, StartSessionRequest, StartSessionResult,
};

/// Fixed phrasings of "I don't know how to say it", matched after
/// whitespace-stripping like crisis keywords.
const STUCK_STEMS: &[&str] = &[
    "뭐라고말해야할지",
    "어떻게말해야할지",
    "뭐라고해야할지",
    "말로표현하기어려",
    "어떻게표현해야할지",
];

/// Orchestrates the counseling turn protocol over a session store, an
/// optional profile store, and a language-model backend.
pub struct ConversationOrchestrator<S: SessionStore, P: UserProfileStore> {
    lifecycle: SessionLifecycle<S>,
    llm: Arc<BoxLanguageModel>,
    policy: UsagePolicy,
    detector: CrisisDetector,
    profiles: Option<P>,
    config: ChatConfig,
}

impl<S: SessionStore, P: UserProfileStore> ConversationOrchestrator<S, P> {
    pub fn new(
        lifecycle: SessionLifecycle<S>,
        llm: Arc<BoxLanguageModel>,
        profiles: Option<P>,
    ) -> Self {
        let config = lifecycle.config().clone();
        Self {
            policy: UsagePolicy::new(&config),
            detector: CrisisDetector::new(),
            lifecycle,
            llm,
            profiles,
            config,
        }
    }

    pub fn lifecycle(&self) -> &SessionLifecycle<S> {
        &self.lifecycle
    }

    /// Start a new session: validate input, enforce the quota, fold in
    /// prior-session history, and fetch the first guided options.
    #[tracing::instrument(name = "start_session", skip_all, fields(user = %req.user.id))]
    pub async fn start_session(
        &self,
        req: StartSessionRequest,
    ) -> Result<StartSessionResult, ChatError> {
        if let Some(text) = &req.initial_text {
            let chars = text.chars().count();
            if req.is_import {
                if chars > self.config.import_char_cap {
                    return Err(ChatError::Validation(format!(
                        "가져온 대화는 {}자까지 등록할 수 있어요 (현재 {chars}자).",
                        self.config.import_char_cap
                    )));
                }
            } else if chars > self.config.input_char_cap {
                return Err(ChatError::Validation(format!(
                    "입력은 {}자까지 가능해요 (현재 {chars}자).",
                    self.config.input_char_cap
                )));
            }
        }

        if !req.user.id.is_anonymous() {
            let count = self.lifecycle.store().count_by_user(&req.user.id).await?;
            let decision = self.policy.can_start_session(&req.user, count);
            if !decision.allowed {
                return Err(ChatError::QuotaExceeded {
                    session_count: count,
                    limit: decision.limit,
                });
            }
        }

        let mut has_history = false;
        let mut previous_session_summary = None;
        let mut seed_entries: Vec<ContextEntry> = Vec::new();

        // Prior-session lookup is skipped entirely for anonymous users.
        if !req.user.id.is_anonymous() {
            let summaries = self
                .lifecycle
                .store()
                .find_recent_completed_summaries(&req.user.id, self.config.history_limit)
                .await?;
            if !summaries.is_empty() {
                has_history = true;
                previous_session_summary = summaries.first().cloned();
                seed_entries.push(ContextEntry::system(
                    EntryTag::PreviousSessions,
                    summaries.join(" / "),
                ));
            }
        }

        let mut has_input = false;
        match (req.initial_text, req.import_summary) {
            (Some(text), import_summary) if req.is_import => {
                let note = match import_summary {
                    Some(approved) => approved,
                    None => self.llm.summarize_imported_text(&text).await?,
                };
                seed_entries.push(ContextEntry::system(EntryTag::Import, note));
                has_input = true;
            }
            (Some(text), _) => {
                seed_entries.push(ContextEntry::user(text));
                has_input = true;
            }
            (None, Some(approved)) => {
                seed_entries.push(ContextEntry::system(EntryTag::Import, approved));
                has_input = true;
            }
            (None, None) => {}
        }

        let session = self
            .lifecycle
            .create(req.user.id, req.category, req.counselor_type)
            .await?;

        let phase = if has_input {
            OptionPhase::Collecting
        } else {
            OptionPhase::Initial
        };

        let mut lines = session.render_context();
        lines.extend(seed_entries.iter().map(ContextEntry::render));

        let opts = self
            .llm
            .generate_options(&lines, phase, &session.category, session.counselor_type)
            .await?;

        seed_entries.push(ContextEntry::counselor(opts.question.clone()));
        let updated = self.lifecycle.append(&session.id, &seed_entries).await?;

        Ok(StartSessionResult {
            session_id: session.id,
            question: opts.question,
            options: opts.options,
            can_proceed_to_response: opts.can_proceed_to_response,
            context_count: updated.context.len(),
            has_history,
            previous_session_summary,
        })
    }

    /// Process a guided-option selection: crisis fast-track, stuck-phrase
    /// recap, or the next guided round.
    #[tracing::instrument(name = "select_option", skip_all, fields(session_id = %session_id))]
    pub async fn select_option(
        &self,
        user: &UserId,
        session_id: &Uuid,
        selected: &str,
    ) -> Result<SelectOptionResult, ChatError> {
        self.validate_input_len(selected)?;

        let session = self.lifecycle.find_by_id(session_id).await?;
        check_owner(&session, user)?;

        if session.context.len() >= self.config.context_cap {
            return Err(ChatError::Validation(format!(
                "이 세션의 대화가 가득 찼어요 ({}개). 세션을 마무리하고 새로 시작해 주세요.",
                self.config.context_cap
            )));
        }

        // A crisis always fast-tracks to being able to respond.
        let assessment = self.detector.detect(selected);
        if assessment.is_crisis() {
            let entry = ContextEntry::tagged(EntryRole::User, EntryTag::Crisis, selected);
            let updated = self.lifecycle.append(session_id, &[entry]).await?;
            self.lifecycle.maybe_compact(&updated).await;
            return Ok(SelectOptionResult {
                is_crisis: true,
                crisis_level: assessment.level,
                recommended_action: assessment.recommended_action,
                empathy: None,
                feedback: None,
                context_summary: None,
                question: None,
                options: Vec::new(),
                can_proceed_to_response: true,
                response_modes: ResponseMode::ALL.to_vec(),
                context_count: updated.context.len(),
            });
        }

        let lines = session.render_context();

        if is_stuck_phrase(selected) {
            let recap = self.llm.summarize_context_for_stuck(&lines).await?;
            let selection = ContextEntry::tagged(EntryRole::User, EntryTag::Stuck, selected);

            let mut input = lines;
            input.push(selection.render());
            let opts = self
                .llm
                .generate_options(
                    &input,
                    OptionPhase::Collecting,
                    &session.category,
                    session.counselor_type,
                )
                .await?;

            let question = ContextEntry::counselor(opts.question.clone());
            let updated = self.lifecycle.append(session_id, &[selection, question]).await?;
            self.lifecycle.maybe_compact(&updated).await;

            return Ok(SelectOptionResult {
                is_crisis: false,
                crisis_level: CrisisLevel::None,
                recommended_action: None,
                empathy: None,
                feedback: None,
                context_summary: Some(recap),
                question: Some(opts.question),
                options: opts.options,
                can_proceed_to_response: opts.can_proceed_to_response,
                response_modes: proceed_modes(opts.can_proceed_to_response),
                context_count: updated.context.len(),
            });
        }

        let empathy = self.llm.generate_empathy_comment(selected, &lines).await?;
        let feedback = if session.counselor_type.profile().gives_feedback {
            Some(
                self.llm
                    .generate_counselor_feedback(selected, &lines, session.counselor_type)
                    .await?,
            )
        } else {
            None
        };

        let selection = ContextEntry::user(selected);
        let mut input = lines;
        input.push(selection.render());
        let opts = self
            .llm
            .generate_options(
                &input,
                OptionPhase::Collecting,
                &session.category,
                session.counselor_type,
            )
            .await?;

        let question = ContextEntry::counselor(opts.question.clone());
        let updated = self.lifecycle.append(session_id, &[selection, question]).await?;
        self.lifecycle.maybe_compact(&updated).await;

        Ok(SelectOptionResult {
            is_crisis: false,
            crisis_level: CrisisLevel::None,
            recommended_action: None,
            empathy: Some(empathy),
            feedback,
            context_summary: None,
            question: Some(opts.question),
            options: opts.options,
            can_proceed_to_response: opts.can_proceed_to_response,
            response_modes: proceed_modes(opts.can_proceed_to_response),
            context_count: updated.context.len(),
        })
    }

    /// Persist the chosen free-response style, then generate a reply.
    pub async fn set_mode(
        &self,
        user: &UserId,
        session_id: &Uuid,
        mode: ResponseMode,
        user_message: Option<&str>,
    ) -> Result<GenerateResponseResult, ChatError> {
        let session = self.lifecycle.find_by_id(session_id).await?;
        check_owner(&session, user)?;
        self.lifecycle.set_response_mode(session_id, mode).await?;
        self.generate_response(user, session_id, user_message).await
    }

    /// Generate the counselor's free-response reply for one turn.
    #[tracing::instrument(name = "generate_response", skip_all, fields(session_id = %session_id))]
    pub async fn generate_response(
        &self,
        user: &UserId,
        session_id: &Uuid,
        user_message: Option<&str>,
    ) -> Result<GenerateResponseResult, ChatError> {
        let session = self.lifecycle.find_by_id(session_id).await?;
        check_owner(&session, user)?;
        self.check_free_chat_cap(&session)?;

        if let Some(msg) = user_message {
            self.validate_input_len(msg)?;

            let assessment = self.detector.detect(msg);
            if assessment.is_crisis() {
                let reply = crisis_reply(&assessment);
                let entries = [
                    ContextEntry::tagged(EntryRole::User, EntryTag::Crisis, msg),
                    ContextEntry::tagged(EntryRole::Counselor, EntryTag::Crisis, reply.clone()),
                ];
                let updated = self.lifecycle.append(session_id, &entries).await?;
                self.lifecycle.maybe_compact(&updated).await;
                return Ok(GenerateResponseResult {
                    reply,
                    is_crisis: true,
                    crisis_level: assessment.level,
                    recommended_action: assessment.recommended_action,
                    context_count: updated.context.len(),
                });
            }
        }

        let mode = session.response_mode.unwrap_or(ResponseMode::Listen);
        let reply = self
            .llm
            .generate_response(
                &session.render_context(),
                mode,
                user_message,
                session.counselor_type,
            )
            .await?;

        let mut entries = Vec::with_capacity(2);
        if let Some(msg) = user_message {
            entries.push(ContextEntry::user(msg));
        }
        entries.push(ContextEntry::counselor(reply.clone()));
        let updated = self.lifecycle.append(session_id, &entries).await?;
        self.lifecycle.maybe_compact(&updated).await;

        Ok(GenerateResponseResult {
            reply,
            is_crisis: false,
            crisis_level: CrisisLevel::None,
            recommended_action: None,
            context_count: updated.context.len(),
        })
    }

    /// Streaming variant of `generate_response`.
    ///
    /// Chunks are forwarded as they arrive; the accumulated text (with
    /// the user message) is appended to context only after the upstream
    /// stream completes cleanly. Dropping the returned stream before
    /// completion commits nothing, so a client disconnect never leaves a
    /// truncated fragment in the transcript.
    pub async fn generate_response_stream(
        &self,
        user: &UserId,
        session_id: &Uuid,
        user_message: Option<String>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + '_>>, ChatError>
    {
        let session = self.lifecycle.find_by_id(session_id).await?;
        check_owner(&session, user)?;
        self.check_free_chat_cap(&session)?;

        if let Some(msg) = &user_message {
            self.validate_input_len(msg)?;

            let assessment = self.detector.detect(msg);
            if assessment.is_crisis() {
                // Crisis turns are committed up front and streamed as a
                // single canned chunk.
                let reply = crisis_reply(&assessment);
                let entries = [
                    ContextEntry::tagged(EntryRole::User, EntryTag::Crisis, msg.clone()),
                    ContextEntry::tagged(EntryRole::Counselor, EntryTag::Crisis, reply.clone()),
                ];
                let updated = self.lifecycle.append(session_id, &entries).await?;
                self.lifecycle.maybe_compact(&updated).await;
                return Ok(Box::pin(futures_util::stream::once(async move {
                    Ok::<_, ChatError>(reply)
                })));
            }
        }

        let mode = session.response_mode.unwrap_or(ResponseMode::Listen);
        let mut inner = self.llm.generate_response_stream(
            session.render_context(),
            mode,
            user_message.clone(),
            session.counselor_type,
        );
        let session_id = *session_id;

        let stream = async_stream::try_stream! {
            let mut accumulated = String::new();
            while let Some(chunk) = inner.next().await {
                let chunk = chunk?;
                accumulated.push_str(&chunk);
                yield chunk;
            }

            // Only a fully completed stream commits the turn.
            let mut entries = Vec::with_capacity(2);
            if let Some(msg) = user_message {
                entries.push(ContextEntry::user(msg));
            }
            entries.push(ContextEntry::counselor(accumulated));
            let updated = self.lifecycle.append(&session_id, &entries).await?;
            self.lifecycle.maybe_compact(&updated).await;
        };

        Ok(Box::pin(stream))
    }

    /// End a session: produce the final one-line summary and mark it
    /// completed.
    pub async fn end_session(&self, user: &UserId, session_id: &Uuid) -> Result<String, ChatError> {
        let session = self.lifecycle.find_by_id(session_id).await?;
        check_owner(&session, user)?;

        let completed = self.lifecycle.complete(session_id).await?;
        Ok(completed.summary.unwrap_or_default())
    }

    /// Reactivate a completed session, folding in the user's long-term
    /// profile précis when one is available. The profile lookup is
    /// best-effort; the resume succeeds without it. Resuming an
    /// already-active session is a no-op and folds nothing in.
    pub async fn resume_session(
        &self,
        user: &UserId,
        session_id: &Uuid,
    ) -> Result<Session, ChatError> {
        let session = self.lifecycle.find_by_id(session_id).await?;
        check_owner(&session, user)?;
        let was_completed = session.status == SessionStatus::Completed;

        let mut session = self.lifecycle.resume(session_id).await?;

        if !was_completed {
            return Ok(session);
        }

        if let Some(profiles) = &self.profiles {
            if !user.is_anonymous() {
                match profiles.get_profile_summary(user).await {
                    Ok(Some(precis)) => {
                        let entry = ContextEntry::system(EntryTag::Profile, precis);
                        match self.lifecycle.append(session_id, &[entry]).await {
                            Ok(updated) => session = updated,
                            Err(err) => {
                                warn!(session_id = %session_id, error = %err, "Could not fold profile summary into resumed session");
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(session_id = %session_id, error = %err, "Profile lookup failed; resuming without it");
                    }
                }
            }
        }

        Ok(session)
    }

    fn validate_input_len(&self, text: &str) -> Result<(), ChatError> {
        let chars = text.chars().count();
        if chars > self.config.input_char_cap {
            return Err(ChatError::Validation(format!(
                "입력은 {}자까지 가능해요 (현재 {chars}자).",
                self.config.input_char_cap
            )));
        }
        Ok(())
    }

    /// Free-chat turns are heavier than guided selections, so they have
    /// their own lower cap counted over user-role entries only (the
    /// guided cap counts the raw context length).
    fn check_free_chat_cap(&self, session: &Session) -> Result<(), ChatError> {
        if session.user_turn_count() >= self.config.free_chat_cap {
            return Err(ChatError::Validation(format!(
                "이 세션에서 보낼 수 있는 메시지 {}개를 모두 사용했어요. 세션을 마무리하고 새로 시작해 주세요.",
                self.config.free_chat_cap
            )));
        }
        Ok(())
    }
}

fn check_owner(session: &Session, user: &UserId) -> Result<(), ChatError> {
    if session.user_id == *user {
        Ok(())
    } else {
        Err(ChatError::AccessDenied)
    }
}

fn proceed_modes(can_proceed: bool) -> Vec<ResponseMode> {
    if can_proceed {
        ResponseMode::ALL.to_vec()
    } else {
        Vec::new()
    }
}

/// Severity-tiered canned reply for crisis turns, referencing the
/// tier's resource message. No model call is made on this path.
fn crisis_reply(assessment: &CrisisAssessment) -> String {
    let action = assessment.recommended_action.as_deref().unwrap_or("");
    match assessment.level {
        CrisisLevel::High => format!(
            "지금 마음이 많이 위험하게 느껴져서 걱정돼요. 이 순간을 혼자 견디지 않으셔도 돼요. {action}"
        ),
        _ => format!(
            "요즘 마음이 많이 무거우셨던 것 같아요. 이야기해 주셔서 고마워요. {action}"
        ),
    }
}

fn is_stuck_phrase(text: &str) -> bool {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    STUCK_STEMS.iter().any(|stem| normalized.contains(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use maum_types::error::StoreError;
    use maum_types::llm::{GuidedOptions, LlmError};
    use maum_types::quota::UserAccount;
    use maum_types::session::CounselorType;

    use crate::llm::LanguageModel;
    use crate::llm::client::ReplyStream;

    // --- Mock store ---

    #[derive(Default)]
    struct MemStore {
        sessions: Mutex<HashMap<Uuid, Session>>,
        history_lookups: AtomicUsize,
    }

    impl SessionStore for MemStore {
        async fn create(&self, session: &Session) -> Result<Session, StoreError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id, session.clone());
            Ok(session.clone())
        }

        async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, StoreError> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn update(&self, session: &Session) -> Result<(), StoreError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id, session.clone());
            Ok(())
        }

        async fn find_active_by_user(&self, user: &UserId) -> Result<Vec<Session>, StoreError> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.user_id == *user && s.status == maum_types::session::SessionStatus::Active)
                .cloned()
                .collect())
        }

        async fn append_entries(
            &self,
            session_id: &Uuid,
            entries: &[ContextEntry],
            cap: usize,
        ) -> Result<Session, StoreError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(session_id).ok_or(StoreError::NotFound)?;
            if session.context.len() >= cap {
                return Err(StoreError::ContextCapExceeded {
                    len: session.context.len(),
                    cap,
                });
            }
            session.context.extend_from_slice(entries);
            Ok(session.clone())
        }

        async fn set_response_mode(
            &self,
            session_id: &Uuid,
            mode: ResponseMode,
        ) -> Result<Session, StoreError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(session_id).ok_or(StoreError::NotFound)?;
            session.response_mode = Some(mode);
            Ok(session.clone())
        }

        async fn replace_context_and_summary(
            &self,
            session_id: &Uuid,
            context: Vec<ContextEntry>,
            rolling_summary: String,
        ) -> Result<Session, StoreError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(session_id).ok_or(StoreError::NotFound)?;
            session.context = context;
            session.rolling_summary = Some(rolling_summary);
            Ok(session.clone())
        }

        async fn count_by_user(&self, user: &UserId) -> Result<u32, StoreError> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.user_id == *user)
                .count() as u32)
        }

        async fn find_recent_completed_summaries(
            &self,
            _user: &UserId,
            _limit: usize,
        ) -> Result<Vec<String>, StoreError> {
            self.history_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct NoProfiles;

    impl UserProfileStore for NoProfiles {
        async fn get_profile_summary(&self, _user: &UserId) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    // --- Scripted model ---

    struct ScriptedModel;

    impl LanguageModel for ScriptedModel {
        async fn generate_options(
            &self,
            _context: &[String],
            _phase: maum_types::llm::OptionPhase,
            _category: &str,
            _counselor_type: CounselorType,
        ) -> Result<GuidedOptions, LlmError> {
            Ok(GuidedOptions {
                question: "어떤 일이 있으셨나요?".to_string(),
                options: vec!["직장 문제예요".to_string(), "관계 문제예요".to_string()],
                can_proceed_to_response: false,
                can_request_feedback: true,
            })
        }

        async fn generate_response(
            &self,
            _context: &[String],
            _mode: ResponseMode,
            _user_message: Option<&str>,
            _counselor_type: CounselorType,
        ) -> Result<String, LlmError> {
            Ok("많이 애쓰셨어요.".to_string())
        }

        fn generate_response_stream(
            &self,
            _context: Vec<String>,
            _mode: ResponseMode,
            _user_message: Option<String>,
            _counselor_type: CounselorType,
        ) -> ReplyStream {
            Box::pin(futures_util::stream::iter(vec![
                Ok("많이 ".to_string()),
                Ok("애쓰셨어요.".to_string()),
            ]))
        }

        async fn generate_empathy_comment(
            &self,
            _selection: &str,
            _context: &[String],
        ) -> Result<String, LlmError> {
            Ok("그러셨군요.".to_string())
        }

        async fn generate_counselor_feedback(
            &self,
            _selection: &str,
            _context: &[String],
            _counselor_type: CounselorType,
        ) -> Result<String, LlmError> {
            Ok("그 상황이라면 누구라도 힘들었을 거예요.".to_string())
        }

        async fn summarize_session(&self, _context: &[String]) -> Result<String, LlmError> {
            Ok("직장 스트레스로 지친 마음".to_string())
        }

        async fn summarize_imported_text(&self, _text: &str) -> Result<String, LlmError> {
            Ok("가져온 대화 요약".to_string())
        }

        async fn summarize_context_for_stuck(
            &self,
            _context: &[String],
        ) -> Result<String, LlmError> {
            Ok("지금까지 직장 문제로 힘들다는 이야기를 나눴어요.".to_string())
        }

        async fn generate_rolling_summary(
            &self,
            _existing: Option<&str>,
            _entries: &[String],
        ) -> Result<String, LlmError> {
            Ok("이전 대화 요약".to_string())
        }
    }

    fn orchestrator() -> ConversationOrchestrator<MemStore, NoProfiles> {
        let llm = Arc::new(BoxLanguageModel::new(ScriptedModel));
        let lifecycle = SessionLifecycle::new(MemStore::default(), llm.clone(), ChatConfig::default());
        ConversationOrchestrator::new(lifecycle, llm, Some(NoProfiles))
    }

    #[tokio::test]
    async fn test_anonymous_start_skips_history_lookup() {
        let orch = orchestrator();
        let result = orch
            .start_session(StartSessionRequest::new(
                UserAccount::anonymous(),
                Some("self".to_string()),
            ))
            .await
            .unwrap();

        assert!(!result.has_history);
        assert!(result.previous_session_summary.is_none());
        assert!(!result.options.is_empty());
        assert_eq!(
            orch.lifecycle()
                .store()
                .history_lookups
                .load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_select_option_crisis_appends_one_tagged_entry() {
        let orch = orchestrator();
        let started = orch
            .start_session(StartSessionRequest::new(UserAccount::anonymous(), None))
            .await
            .unwrap();
        let before = started.context_count;

        let result = orch
            .select_option(&UserId::Anonymous, &started.session_id, "죽고 싶어")
            .await
            .unwrap();

        assert!(result.is_crisis);
        assert_eq!(result.crisis_level, CrisisLevel::High);
        assert!(result.can_proceed_to_response);
        assert!(result.recommended_action.is_some());
        assert_eq!(result.response_modes.len(), ResponseMode::ALL.len());
        assert_eq!(result.context_count, before + 1);

        let session = orch
            .lifecycle()
            .find_by_id(&started.session_id)
            .await
            .unwrap();
        let last = session.context.last().unwrap();
        assert_eq!(last.tag, Some(EntryTag::Crisis));
        assert_eq!(last.role, EntryRole::User);
    }

    #[tokio::test]
    async fn test_overlong_message_rejected_before_mutation() {
        let orch = orchestrator();
        let started = orch
            .start_session(StartSessionRequest::new(UserAccount::anonymous(), None))
            .await
            .unwrap();
        let before = started.context_count;

        let long = "가".repeat(501);
        let err = orch
            .generate_response(&UserId::Anonymous, &started.session_id, Some(&long))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));

        let session = orch
            .lifecycle()
            .find_by_id(&started.session_id)
            .await
            .unwrap();
        assert_eq!(session.context.len(), before);
    }

    #[tokio::test]
    async fn test_quota_rejection_is_structured() {
        let orch = orchestrator();
        let user = UserAccount::registered("user-1");

        for _ in 0..3 {
            orch.start_session(StartSessionRequest::new(user.clone(), None))
                .await
                .unwrap();
        }

        let err = orch
            .start_session(StartSessionRequest::new(user, None))
            .await
            .unwrap_err();
        match err {
            ChatError::QuotaExceeded {
                session_count,
                limit,
            } => {
                assert_eq!(session_count, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stuck_phrase_returns_recap_and_fresh_options() {
        let orch = orchestrator();
        let started = orch
            .start_session(StartSessionRequest::new(UserAccount::anonymous(), None))
            .await
            .unwrap();

        let result = orch
            .select_option(
                &UserId::Anonymous,
                &started.session_id,
                "뭐라고 말해야 할지 모르겠어요",
            )
            .await
            .unwrap();

        assert!(!result.is_crisis);
        assert!(result.context_summary.is_some());
        assert!(result.question.is_some());
        assert!(!result.options.is_empty());
    }

    #[tokio::test]
    async fn test_ownership_mismatch_denied() {
        let orch = orchestrator();
        let started = orch
            .start_session(StartSessionRequest::new(
                UserAccount::registered("owner"),
                None,
            ))
            .await
            .unwrap();

        let intruder: UserId = "intruder".parse().unwrap();
        let err = orch
            .select_option(&intruder, &started.session_id, "직장 문제예요")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::AccessDenied));
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let orch = orchestrator();
        let err = orch
            .generate_response(&UserId::Anonymous, &Uuid::now_v7(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotFound));
    }

    #[tokio::test]
    async fn test_listening_counselor_skips_feedback() {
        let orch = orchestrator();
        let started = orch
            .start_session(StartSessionRequest::new(UserAccount::anonymous(), None))
            .await
            .unwrap();

        let result = orch
            .select_option(&UserId::Anonymous, &started.session_id, "직장 문제예요")
            .await
            .unwrap();

        // Default counselor type is Listening.
        assert!(result.empathy.is_some());
        assert!(result.feedback.is_none());
    }

    #[tokio::test]
    async fn test_non_listening_counselor_gets_feedback() {
        let orch = orchestrator();
        let mut req = StartSessionRequest::new(UserAccount::anonymous(), None);
        req.counselor_type = Some(CounselorType::Empathetic);
        let started = orch.start_session(req).await.unwrap();

        let result = orch
            .select_option(&UserId::Anonymous, &started.session_id, "직장 문제예요")
            .await
            .unwrap();
        assert!(result.feedback.is_some());
    }

    #[tokio::test]
    async fn test_set_mode_persists_then_replies() {
        let orch = orchestrator();
        let started = orch
            .start_session(StartSessionRequest::new(UserAccount::anonymous(), None))
            .await
            .unwrap();

        let result = orch
            .set_mode(
                &UserId::Anonymous,
                &started.session_id,
                ResponseMode::Comfort,
                Some("요즘 계속 지쳐 있어요"),
            )
            .await
            .unwrap();
        assert!(!result.reply.is_empty());

        let session = orch
            .lifecycle()
            .find_by_id(&started.session_id)
            .await
            .unwrap();
        assert_eq!(session.response_mode, Some(ResponseMode::Comfort));
    }

    #[tokio::test]
    async fn test_crisis_in_free_chat_commits_pair_without_model_reply() {
        let orch = orchestrator();
        let started = orch
            .start_session(StartSessionRequest::new(UserAccount::anonymous(), None))
            .await
            .unwrap();
        let before = started.context_count;

        let result = orch
            .generate_response(
                &UserId::Anonymous,
                &started.session_id,
                Some("그냥 다 사라지고 싶어"),
            )
            .await
            .unwrap();

        assert!(result.is_crisis);
        assert_eq!(result.crisis_level, CrisisLevel::Medium);
        // Canned reply embeds the resource message.
        assert!(result.reply.contains("1393"));
        assert_eq!(result.context_count, before + 2);
    }

    #[test]
    fn test_stuck_phrase_matching_ignores_whitespace() {
        assert!(is_stuck_phrase("뭐라고 말해야 할지 모르겠어요"));
        assert!(is_stuck_phrase("어떻게말해야할지..."));
        assert!(!is_stuck_phrase("직장 문제예요"));
    }
}
