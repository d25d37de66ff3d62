//! Keyword-tier crisis detector.
//!
//! Classifies free text into a crisis severity level by substring
//! matching against three ordered keyword tiers. Input is lower-cased and
//! stripped of all whitespace before matching, so spaced-out phrasings
//! ("죽 고 싶 어") still hit their keyword ("죽고싶"). Tiers are evaluated
//! in strict priority order: any high-tier hit wins and lower tiers are
//! not evaluated, so a message carrying both a high-severity and a
//! low-severity cue is never under-classified.

use maum_types::crisis::{CrisisAssessment, CrisisLevel};

/// High tier: direct self-harm or suicide signals.
const HIGH_KEYWORDS: &[&str] = &[
    "죽고싶",
    "죽어버리고싶",
    "죽을래",
    "자살",
    "목숨을끊",
    "유서",
    "목을매",
    "뛰어내리",
    "생을마감",
];

/// Medium tier: ideation-adjacent signals.
const MEDIUM_KEYWORDS: &[&str] = &[
    "사라지고싶",
    "없어지고싶",
    "살기싫",
    "살고싶지않",
    "자해",
    "다끝내고싶",
    "포기하고싶",
];

/// Low tier: distress signals, informational only.
const LOW_KEYWORDS: &[&str] = &[
    "너무힘들",
    "우울",
    "지쳤",
    "외로",
    "불안",
    "무기력",
    "잠이안와",
];

/// Resource message for high-tier matches.
const HIGH_ACTION: &str = "지금 많이 위험하다고 느껴져요. 자살예방상담전화 1393 또는 \
정신건강위기상담 1577-0199에 바로 연락해 주세요. 긴급한 상황이라면 112나 119로 전화해 주세요.";

/// Resource message for medium-tier matches.
const MEDIUM_ACTION: &str = "혼자 버티지 않으셔도 돼요. 자살예방상담전화 1393, \
청소년전화 1388에서 24시간 이야기를 들어드려요.";

/// Classifies user input for self-harm risk signals.
///
/// Pure function: no side effects, never fails; absence of a match is a
/// valid outcome (`CrisisLevel::None`).
#[derive(Debug, Default, Clone, Copy)]
pub struct CrisisDetector;

impl CrisisDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify `text` into a crisis assessment.
    ///
    /// At most one tier is ever reported; multiple hits within the
    /// winning tier are all recorded in `matched_keywords` but do not
    /// escalate beyond that tier.
    pub fn detect(&self, text: &str) -> CrisisAssessment {
        let normalized = normalize(text);

        let tiers: [(&[&str], CrisisLevel, Option<&str>); 3] = [
            (HIGH_KEYWORDS, CrisisLevel::High, Some(HIGH_ACTION)),
            (MEDIUM_KEYWORDS, CrisisLevel::Medium, Some(MEDIUM_ACTION)),
            (LOW_KEYWORDS, CrisisLevel::Low, None),
        ];

        for (keywords, level, action) in tiers {
            let matched: Vec<String> = keywords
                .iter()
                .filter(|kw| normalized.contains(&normalize(kw)))
                .map(|kw| kw.to_string())
                .collect();
            if !matched.is_empty() {
                return CrisisAssessment {
                    level,
                    matched_keywords: matched,
                    recommended_action: action.map(str::to_string),
                };
            }
        }

        CrisisAssessment::none()
    }
}

/// Lowercase and strip all whitespace.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_keyword_detected() {
        let assessment = CrisisDetector::new().detect("요즘 죽고싶다는 생각이 들어");
        assert_eq!(assessment.level, CrisisLevel::High);
        assert!(assessment.is_crisis());
        assert!(assessment.recommended_action.is_some());
    }

    #[test]
    fn test_spaced_out_evasion_still_matches() {
        let assessment = CrisisDetector::new().detect("죽 고 싶 어");
        assert_eq!(assessment.level, CrisisLevel::High);
        assert!(assessment.matched_keywords.contains(&"죽고싶".to_string()));
    }

    #[test]
    fn test_medium_keyword_detected() {
        let assessment = CrisisDetector::new().detect("그냥 다 사라지고 싶어요");
        assert_eq!(assessment.level, CrisisLevel::Medium);
        assert!(assessment.is_crisis());
        assert!(assessment.recommended_action.is_some());
    }

    #[test]
    fn test_low_keyword_informational_only() {
        let assessment = CrisisDetector::new().detect("요즘 너무 힘들고 우울해");
        assert_eq!(assessment.level, CrisisLevel::Low);
        assert!(!assessment.is_crisis());
        assert!(assessment.recommended_action.is_none());
    }

    #[test]
    fn test_no_match() {
        let assessment = CrisisDetector::new().detect("오늘 날씨가 좋네요");
        assert_eq!(assessment.level, CrisisLevel::None);
        assert!(!assessment.is_crisis());
        assert!(assessment.matched_keywords.is_empty());
        assert!(assessment.recommended_action.is_none());
    }

    #[test]
    fn test_high_shadows_low() {
        // Contains both a low-tier cue (너무 힘들) and a high-tier cue.
        let assessment = CrisisDetector::new().detect("너무 힘들어서 죽고 싶어");
        assert_eq!(assessment.level, CrisisLevel::High);
        // Low-tier hits are not recorded when a higher tier wins.
        assert!(
            assessment
                .matched_keywords
                .iter()
                .all(|kw| HIGH_KEYWORDS.contains(&kw.as_str()))
        );
    }

    #[test]
    fn test_high_shadows_medium() {
        let assessment = CrisisDetector::new().detect("자해도 했고 자살 생각도 해");
        assert_eq!(assessment.level, CrisisLevel::High);
    }

    #[test]
    fn test_multiple_hits_within_tier_all_recorded() {
        let assessment = CrisisDetector::new().detect("죽고싶고 자살하고 싶어");
        assert_eq!(assessment.level, CrisisLevel::High);
        assert!(assessment.matched_keywords.len() >= 2);
    }

    #[test]
    fn test_empty_input() {
        let assessment = CrisisDetector::new().detect("");
        assert_eq!(assessment.level, CrisisLevel::None);
    }
}
