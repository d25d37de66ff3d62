//! Subscription and usage-quota types.
//!
//! A quota is derived, never stored: it is evaluated from the user's
//! account flags and current session count at session-creation time only.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::session::UserId;

/// Paid subscription tier. Each tier adds bonus sessions on top of the
/// base free limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Basic,
    Standard,
    Premium,
}

impl SubscriptionTier {
    /// Extra sessions granted beyond the base free limit.
    pub fn bonus_sessions(&self) -> u32 {
        match self {
            SubscriptionTier::Basic => 7,
            SubscriptionTier::Standard => 27,
            SubscriptionTier::Premium => 97,
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTier::Basic => write!(f, "basic"),
            SubscriptionTier::Standard => write!(f, "standard"),
            SubscriptionTier::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(SubscriptionTier::Basic),
            "standard" => Ok(SubscriptionTier::Standard),
            "premium" => Ok(SubscriptionTier::Premium),
            other => Err(format!("invalid subscription tier: '{other}'")),
        }
    }
}

/// The account facts the usage policy needs about a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<SubscriptionTier>,
    /// Legacy accounts exempt from quotas, unconditionally.
    #[serde(default)]
    pub grandfathered: bool,
}

impl UserAccount {
    pub fn anonymous() -> Self {
        Self {
            id: UserId::Anonymous,
            tier: None,
            grandfathered: false,
        }
    }

    pub fn registered(id: impl Into<String>) -> Self {
        Self {
            id: UserId::Registered(id.into()),
            tier: None,
            grandfathered: false,
        }
    }
}

/// Outcome of a session-creation quota check.
///
/// A disallow is a distinct decision outcome, not a generic failure: the
/// caller surfaces it with the count and limit so the client can render an
/// upgrade prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_roundtrip() {
        for tier in [
            SubscriptionTier::Basic,
            SubscriptionTier::Standard,
            SubscriptionTier::Premium,
        ] {
            let parsed: SubscriptionTier = tier.to_string().parse().unwrap();
            assert_eq!(tier, parsed);
        }
    }

    #[test]
    fn test_bonus_sessions_increase_with_tier() {
        assert!(
            SubscriptionTier::Basic.bonus_sessions()
                < SubscriptionTier::Standard.bonus_sessions()
        );
        assert!(
            SubscriptionTier::Standard.bonus_sessions()
                < SubscriptionTier::Premium.bonus_sessions()
        );
    }

    #[test]
    fn test_account_deserialize_defaults() {
        let json = r#"{"id":"user-1"}"#;
        let account: UserAccount = serde_json::from_str(json).unwrap();
        assert!(!account.grandfathered);
        assert!(account.tier.is_none());
    }
}
