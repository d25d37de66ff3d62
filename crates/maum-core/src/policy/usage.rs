//! Session-creation quota policy.
//!
//! Evaluated once at session-creation time from the user's account flags
//! and current owned-session count. Anonymous sessions are not
//! quota-tracked here (the anonymous turn cap is a client-side soft cap,
//! not server-enforced).

use maum_types::config::ChatConfig;
use maum_types::quota::{QuotaDecision, UserAccount};

/// Decides whether a user may start a new session.
#[derive(Debug, Clone)]
pub struct UsagePolicy {
    base_free_limit: u32,
}

impl UsagePolicy {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            base_free_limit: config.base_free_limit,
        }
    }

    /// Rules, in order: anonymous users are always allowed; grandfathered
    /// accounts are always allowed, unconditionally; otherwise the limit
    /// is the base free limit plus the subscription tier's bonus, and the
    /// user is allowed iff their existing count is below it.
    ///
    /// A disallow is a decision outcome, not an error; the caller turns
    /// it into a structured rejection carrying the count and limit.
    pub fn can_start_session(&self, user: &UserAccount, existing: u32) -> QuotaDecision {
        let limit = self.base_free_limit
            + user.tier.map(|t| t.bonus_sessions()).unwrap_or(0);

        let allowed = user.id.is_anonymous() || user.grandfathered || existing < limit;

        QuotaDecision { allowed, limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maum_types::quota::SubscriptionTier;

    fn policy() -> UsagePolicy {
        UsagePolicy::new(&ChatConfig::default())
    }

    #[test]
    fn test_anonymous_always_allowed() {
        let decision = policy().can_start_session(&UserAccount::anonymous(), 1000);
        assert!(decision.allowed);
    }

    #[test]
    fn test_grandfathered_always_allowed() {
        let mut user = UserAccount::registered("legacy-1");
        user.grandfathered = true;
        // Count well past the limit must still allow.
        let decision = policy().can_start_session(&user, 10);
        assert!(decision.allowed);
        assert_eq!(decision.limit, 3);
    }

    #[test]
    fn test_free_user_boundary() {
        let user = UserAccount::registered("user-1");
        let p = policy();

        let decision = p.can_start_session(&user, 2);
        assert!(decision.allowed);

        // Rejected exactly at the base free limit.
        let decision = p.can_start_session(&user, 3);
        assert!(!decision.allowed);
        assert_eq!(decision.limit, 3);
    }

    #[test]
    fn test_subscription_raises_limit() {
        let mut user = UserAccount::registered("user-2");
        user.tier = Some(SubscriptionTier::Basic);
        let p = policy();

        let expected = 3 + SubscriptionTier::Basic.bonus_sessions();
        let decision = p.can_start_session(&user, expected - 1);
        assert!(decision.allowed);
        assert_eq!(decision.limit, expected);

        let decision = p.can_start_session(&user, expected);
        assert!(!decision.allowed);
    }
}
