//! Crisis assessment types.
//!
//! Produced per input string by the crisis detector; folded into the
//! session transcript as an annotated entry when a crisis is detected,
//! never persisted as a distinct entity.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Severity tier of a crisis assessment.
///
/// Ordered: `None < Low < Medium < High`. Only medium and high are
/// actionable; low is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisLevel {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for CrisisLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrisisLevel::None => write!(f, "none"),
            CrisisLevel::Low => write!(f, "low"),
            CrisisLevel::Medium => write!(f, "medium"),
            CrisisLevel::High => write!(f, "high"),
        }
    }
}

/// Result of classifying one input string for self-harm risk signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisAssessment {
    pub level: CrisisLevel,
    /// Every keyword that matched within the winning tier.
    pub matched_keywords: Vec<String>,
    /// Static resource message (hotlines) for high/medium tiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
}

impl CrisisAssessment {
    /// No match on any tier.
    pub fn none() -> Self {
        Self {
            level: CrisisLevel::None,
            matched_keywords: Vec::new(),
            recommended_action: None,
        }
    }

    /// Whether this assessment redirects the conversation flow.
    ///
    /// True only for medium and high tiers.
    pub fn is_crisis(&self) -> bool {
        self.level >= CrisisLevel::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(CrisisLevel::High > CrisisLevel::Medium);
        assert!(CrisisLevel::Medium > CrisisLevel::Low);
        assert!(CrisisLevel::Low > CrisisLevel::None);
    }

    #[test]
    fn test_is_crisis_threshold() {
        let mut assessment = CrisisAssessment::none();
        assert!(!assessment.is_crisis());

        assessment.level = CrisisLevel::Low;
        assert!(!assessment.is_crisis());

        assessment.level = CrisisLevel::Medium;
        assert!(assessment.is_crisis());

        assessment.level = CrisisLevel::High;
        assert!(assessment.is_crisis());
    }

    #[test]
    fn test_level_serde() {
        let json = serde_json::to_string(&CrisisLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
