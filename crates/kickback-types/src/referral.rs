//! Referral graph and bonus-window structures.

use serde::{Deserialize, Serialize};

use crate::{GroupId, Timestamp, UserId};

/// Referral-relevant fields of a user.
///
/// The invitee → referrer edge is a nullable reference, never an in-memory
/// object graph; reverse traversal ("all invitees of X") stays a query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserReferral {
    pub id: UserId,
    pub referrer_id: Option<UserId>,
    /// Lifetime count of batched referrals. Only ever increases.
    pub lifetime_referral_count: u32,
    /// Permanent milestone bonus in basis points. Never decreases.
    pub permanent_override_bps: u16,
    /// ISO country of residence, if known.
    pub home_country: Option<String>,
    /// Self-declared current market, honored for 24 hours after `set_at`.
    pub current_market: Option<String>,
    pub current_market_set_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A batch of invitees tied to one referrer, opening one temporary bonus
/// window. Immutable after creation; expires by wall clock, never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferralGroup {
    pub id: GroupId,
    pub referrer_id: UserId,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
}

impl ReferralGroup {
    /// Whether `now` falls inside the bonus window, boundaries inclusive.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.started_at <= now && now <= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_boundaries_inclusive() {
        let group = ReferralGroup {
            id: 1,
            referrer_id: 7,
            started_at: 1_000,
            expires_at: 2_000,
        };
        assert!(!group.contains(999));
        assert!(group.contains(1_000));
        assert!(group.contains(1_500));
        assert!(group.contains(2_000));
        assert!(!group.contains(2_001));
    }
}
