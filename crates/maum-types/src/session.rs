//! Session, context entry, and counseling style types for Maum.
//!
//! A session's transcript is an ordered list of structured `ContextEntry`
//! records. The legacy flat-string transcript format (role prefixes like
//! `나:` / `상담사:` and bracketed system annotations) survives only as the
//! render format replayed to the language model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Category tag used when a session is started without an explicit topic.
pub const DIRECT_CATEGORY: &str = "direct";

/// Lifecycle status of a counseling session.
///
/// State machine: `active --(complete)--> completed --(resume)--> active`.
/// No other transitions exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Active
    }
}

/// Owner of a session: a registered user id or the anonymous sentinel.
///
/// Serializes as a plain string; `"anonymous"` is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserId {
    Registered(String),
    Anonymous,
}

impl Serialize for UserId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl UserId {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, UserId::Anonymous)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Registered(id) => write!(f, "{id}"),
            UserId::Anonymous => write!(f, "anonymous"),
        }
    }
}

impl FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty user id".to_string());
        }
        if s == "anonymous" {
            Ok(UserId::Anonymous)
        } else {
            Ok(UserId::Registered(s.to_string()))
        }
    }
}

/// Who produced a context entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    User,
    Counselor,
    System,
}

/// Annotation on a context entry beyond its role.
///
/// The legacy transcript encoded these as bracketed prefixes inside the
/// flat string array; here they are an explicit closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryTag {
    /// Seed entry recording the session category.
    Category,
    /// Crisis-flagged input or the canned crisis response.
    Crisis,
    /// Imported prior-conversation text (or its condensed note).
    Import,
    /// Folded-in summaries of the user's previous completed sessions.
    PreviousSessions,
    /// Long-term user profile précis folded in on resume.
    Profile,
    /// "I don't know how to say it" selection.
    Stuck,
}

/// One turn or annotation in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: EntryRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<EntryTag>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ContextEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(EntryRole::User, None, text)
    }

    pub fn counselor(text: impl Into<String>) -> Self {
        Self::new(EntryRole::Counselor, None, text)
    }

    pub fn system(tag: EntryTag, text: impl Into<String>) -> Self {
        Self::new(EntryRole::System, Some(tag), text)
    }

    pub fn tagged(role: EntryRole, tag: EntryTag, text: impl Into<String>) -> Self {
        Self::new(role, Some(tag), text)
    }

    fn new(role: EntryRole, tag: Option<EntryTag>, text: impl Into<String>) -> Self {
        Self {
            role,
            tag,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Render the flat transcript line replayed to the language model.
    ///
    /// User turns get the `나:` prefix, counselor turns `상담사:`, and
    /// system annotations a bracketed tag label.
    pub fn render(&self) -> String {
        match (self.role, self.tag) {
            (EntryRole::User, Some(EntryTag::Crisis)) => format!("[위기감지] 나: {}", self.text),
            (EntryRole::User, _) => format!("나: {}", self.text),
            (EntryRole::Counselor, Some(EntryTag::Crisis)) => {
                format!("[위기대응] 상담사: {}", self.text)
            }
            (EntryRole::Counselor, _) => format!("상담사: {}", self.text),
            (EntryRole::System, tag) => {
                let label = match tag {
                    Some(EntryTag::Category) => "상담주제",
                    Some(EntryTag::Crisis) => "위기감지",
                    Some(EntryTag::Import) => "가져온 대화",
                    Some(EntryTag::PreviousSessions) => "이전 상담 기록",
                    Some(EntryTag::Profile) => "사용자 프로필",
                    Some(EntryTag::Stuck) => "표현 어려움",
                    None => "안내",
                };
                format!("[{label}] {}", self.text)
            }
        }
    }
}

/// Per-session counselor personality profile.
///
/// Fixed once at session creation and consulted on every generation call.
/// `Listening` is the neutral style: it skips the extra counselor-feedback
/// generation during the guided phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounselorType {
    Listening,
    Empathetic,
    Analytical,
    Direct,
}

/// Behavior descriptor for a counselor type.
#[derive(Debug, Clone, Copy)]
pub struct CounselorProfile {
    pub label: &'static str,
    /// Tone instruction injected into generation prompts.
    pub tone: &'static str,
    /// Whether the guided phase generates an extra feedback comment.
    pub gives_feedback: bool,
}

impl CounselorType {
    pub fn profile(&self) -> CounselorProfile {
        match self {
            CounselorType::Listening => CounselorProfile {
                label: "들어주는 상담사",
                tone: "판단 없이 조용히 들어주며 짧게 반응한다",
                gives_feedback: false,
            },
            CounselorType::Empathetic => CounselorProfile {
                label: "공감형 상담사",
                tone: "감정을 먼저 알아주고 따뜻하게 공감한다",
                gives_feedback: true,
            },
            CounselorType::Analytical => CounselorProfile {
                label: "분석형 상담사",
                tone: "상황을 차분히 정리하고 원인을 함께 짚어본다",
                gives_feedback: true,
            },
            CounselorType::Direct => CounselorProfile {
                label: "직설형 상담사",
                tone: "돌려 말하지 않고 솔직하게 의견을 전한다",
                gives_feedback: true,
            },
        }
    }
}

impl Default for CounselorType {
    fn default() -> Self {
        CounselorType::Listening
    }
}

impl fmt::Display for CounselorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounselorType::Listening => write!(f, "listening"),
            CounselorType::Empathetic => write!(f, "empathetic"),
            CounselorType::Analytical => write!(f, "analytical"),
            CounselorType::Direct => write!(f, "direct"),
        }
    }
}

impl FromStr for CounselorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "listening" => Ok(CounselorType::Listening),
            "empathetic" => Ok(CounselorType::Empathetic),
            "analytical" => Ok(CounselorType::Analytical),
            "direct" => Ok(CounselorType::Direct),
            other => Err(format!("invalid counselor type: '{other}'")),
        }
    }
}

/// Free-response generation style, chosen once when the session leaves
/// the guided-option phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Comfort,
    Organize,
    Validate,
    Direction,
    Listen,
    Similar,
}

/// Behavior descriptor for a response mode.
#[derive(Debug, Clone, Copy)]
pub struct ModeDescriptor {
    pub label: &'static str,
    /// Generation instruction for this style.
    pub instruction: &'static str,
}

impl ResponseMode {
    /// All modes, in the order offered to the client.
    pub const ALL: [ResponseMode; 6] = [
        ResponseMode::Comfort,
        ResponseMode::Organize,
        ResponseMode::Validate,
        ResponseMode::Direction,
        ResponseMode::Listen,
        ResponseMode::Similar,
    ];

    pub fn descriptor(&self) -> ModeDescriptor {
        match self {
            ResponseMode::Comfort => ModeDescriptor {
                label: "위로가 필요해요",
                instruction: "지친 마음을 따뜻하게 위로하는 답변을 쓴다",
            },
            ResponseMode::Organize => ModeDescriptor {
                label: "생각을 정리하고 싶어요",
                instruction: "들은 내용을 구조적으로 정리해 되짚어주는 답변을 쓴다",
            },
            ResponseMode::Validate => ModeDescriptor {
                label: "내 감정이 맞는지 알고 싶어요",
                instruction: "느끼는 감정이 자연스럽고 타당함을 확인해주는 답변을 쓴다",
            },
            ResponseMode::Direction => ModeDescriptor {
                label: "방향을 찾고 싶어요",
                instruction: "다음에 시도해볼 수 있는 현실적인 방향을 제안하는 답변을 쓴다",
            },
            ResponseMode::Listen => ModeDescriptor {
                label: "그냥 들어주세요",
                instruction: "조언 없이 경청하고 있음을 전하는 짧은 답변을 쓴다",
            },
            ResponseMode::Similar => ModeDescriptor {
                label: "비슷한 경험이 궁금해요",
                instruction: "비슷한 상황을 겪는 사람들의 일반적인 경험을 들려주는 답변을 쓴다",
            },
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseMode::Comfort => write!(f, "comfort"),
            ResponseMode::Organize => write!(f, "organize"),
            ResponseMode::Validate => write!(f, "validate"),
            ResponseMode::Direction => write!(f, "direction"),
            ResponseMode::Listen => write!(f, "listen"),
            ResponseMode::Similar => write!(f, "similar"),
        }
    }
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comfort" => Ok(ResponseMode::Comfort),
            "organize" => Ok(ResponseMode::Organize),
            "validate" => Ok(ResponseMode::Validate),
            "direction" => Ok(ResponseMode::Direction),
            "listen" => Ok(ResponseMode::Listen),
            "similar" => Ok(ResponseMode::Similar),
            other => Err(format!("invalid response mode: '{other}'")),
        }
    }
}

/// A counseling session.
///
/// The transcript (`context`) is append-only while the session is active
/// and never exceeds the configured hard cap. `rolling_summary` is set once
/// compaction has run at least once. `summary` is populated only on
/// completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: UserId,
    pub category: String,
    pub counselor_type: CounselorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mode: Option<ResponseMode>,
    pub context: Vec<ContextEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub status: SessionStatus,
    pub is_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Number of user turns in the transcript (the free-chat counting base).
    pub fn user_turn_count(&self) -> usize {
        self.context
            .iter()
            .filter(|e| e.role == EntryRole::User)
            .count()
    }

    /// Render the transcript (rolling summary first, if present) as the
    /// flat string lines replayed to the language model.
    pub fn render_context(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.context.len() + 1);
        if let Some(summary) = &self.rolling_summary {
            lines.push(format!("[지난 대화 요약] {summary}"));
        }
        lines.extend(self.context.iter().map(ContextEntry::render));
        lines
    }
}
