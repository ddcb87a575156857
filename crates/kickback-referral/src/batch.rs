//! Referral batch formation.
//!
//! When a referrer accumulates `batch_size` invitees that are eligible
//! (at least one commission at approved or later) and not yet grouped,
//! the oldest-eligible invitees are batched into one new group whose
//! bonus window runs `[now, now + window_secs]`.
//!
//! Formation is idempotent: with no new eligible invitees a repeat call
//! is a no-op, and the membership-exclusive insert in the store makes it
//! impossible for two racing calls to both group the same invitee.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use kickback_db::queries::{groups, users};
use kickback_split::milestone::resolve_permanent_bps;
use kickback_types::config::RevenueConfig;
use kickback_types::referral::ReferralGroup;
use kickback_types::{Timestamp, UserId};

use crate::{ReferralError, Result};

/// Result of a batch formation attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub created: bool,
    pub group: Option<ReferralGroup>,
    /// Ungrouped eligible invitees remaining after this attempt.
    pub remaining_eligible: u32,
}

/// Try to form one new referral batch for `referrer_id`.
///
/// Selects the `batch_size` invitees with the earliest eligibility
/// (invitee id as tie-break) and creates one group. Returns a no-op
/// outcome when fewer than `batch_size` candidates exist.
///
/// On creation the referrer's milestone fields are reconciled as well;
/// see [`refresh_milestones`].
///
/// # Errors
///
/// Persistence failures are propagated — the caller must retry, a
/// silently skipped batch would lose the user's bonus guarantee.
pub fn try_form_new_batch(
    conn: &Connection,
    config: &RevenueConfig,
    referrer_id: UserId,
    now: Timestamp,
) -> Result<BatchOutcome> {
    let eligible = groups::ungrouped_eligible_invitees(conn, referrer_id)?;
    let batch_size = config.batch_size as usize;

    if eligible.len() < batch_size {
        tracing::debug!(
            referrer_id,
            eligible = eligible.len(),
            batch_size,
            "not enough ungrouped eligible invitees, no batch formed"
        );
        return Ok(BatchOutcome {
            created: false,
            group: None,
            remaining_eligible: eligible.len() as u32,
        });
    }

    let selected: Vec<UserId> = eligible.iter().take(batch_size).map(|(id, _)| *id).collect();
    if selected.len() != batch_size {
        return Err(ReferralError::InvariantViolation(format!(
            "selected {} invitees for a batch of {batch_size}",
            selected.len()
        )));
    }

    let started_at = now;
    let expires_at = now + config.window_secs;
    let group_id = groups::insert_group(conn, referrer_id, &selected, started_at, expires_at)?;

    tracing::info!(
        referrer_id,
        group_id,
        invitees = ?selected,
        started_at,
        expires_at,
        "referral batch formed, bonus window opened"
    );

    refresh_milestones(conn, config, referrer_id)?;

    Ok(BatchOutcome {
        created: true,
        group: Some(ReferralGroup {
            id: group_id,
            referrer_id,
            started_at,
            expires_at,
        }),
        remaining_eligible: (eligible.len() - batch_size) as u32,
    })
}

/// Milestone fields after reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneUpdate {
    pub lifetime_count: u32,
    pub permanent_bps: u16,
}

/// Reconcile a referrer's milestone fields from the group store.
///
/// The lifetime count is the number of invitees ever batched for the
/// referrer; the permanent rate follows from the configured threshold
/// table. Both writes are monotonic, so re-running after a partial
/// failure converges instead of corrupting.
pub fn refresh_milestones(
    conn: &Connection,
    config: &RevenueConfig,
    referrer_id: UserId,
) -> Result<MilestoneUpdate> {
    let lifetime_count = groups::member_count_for_referrer(conn, referrer_id)?;
    let permanent_bps = resolve_permanent_bps(lifetime_count, &config.milestones);
    users::raise_milestone(conn, referrer_id, lifetime_count, permanent_bps)?;

    tracing::debug!(referrer_id, lifetime_count, permanent_bps, "milestones reconciled");

    Ok(MilestoneUpdate {
        lifetime_count,
        permanent_bps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickback_db::queries::commissions;
    use kickback_types::DAY_SECS;

    fn test_db() -> Connection {
        kickback_db::open_memory().expect("open test db")
    }

    fn eligible_invitee(conn: &Connection, referrer: UserId, at: Timestamp) -> UserId {
        let invitee = users::insert(conn, Some(referrer), None, at).expect("invitee");
        let commission = commissions::insert(conn, invitee, 1_000, at).expect("commission");
        commissions::approve(conn, commission).expect("approve");
        invitee
    }

    #[test]
    fn test_two_eligible_no_batch() {
        let conn = test_db();
        let config = RevenueConfig::default();
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        eligible_invitee(&conn, referrer, 200);
        eligible_invitee(&conn, referrer, 300);

        let outcome = try_form_new_batch(&conn, &config, referrer, 1_000).expect("attempt");
        assert!(!outcome.created);
        assert!(outcome.group.is_none());
        assert_eq!(outcome.remaining_eligible, 2);
    }

    #[test]
    fn test_four_eligible_batches_three_oldest() {
        let conn = test_db();
        let config = RevenueConfig::default();
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        let a = eligible_invitee(&conn, referrer, 200);
        let b = eligible_invitee(&conn, referrer, 300);
        let c = eligible_invitee(&conn, referrer, 400);
        let d = eligible_invitee(&conn, referrer, 500);

        let outcome = try_form_new_batch(&conn, &config, referrer, 10_000).expect("attempt");
        assert!(outcome.created);
        assert_eq!(outcome.remaining_eligible, 1);

        let group = outcome.group.expect("group");
        assert_eq!(group.started_at, 10_000);
        assert_eq!(group.expires_at, 10_000 + 90 * DAY_SECS);

        let members = groups::group_members(&conn, group.id).expect("members");
        assert_eq!(members, vec![a, b, c]);
        assert!(!members.contains(&d));
    }

    #[test]
    fn test_repeat_call_is_noop() {
        let conn = test_db();
        let config = RevenueConfig::default();
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        for i in 0..3 {
            eligible_invitee(&conn, referrer, 200 + i);
        }

        let first = try_form_new_batch(&conn, &config, referrer, 1_000).expect("first");
        assert!(first.created);

        let second = try_form_new_batch(&conn, &config, referrer, 2_000).expect("second");
        assert!(!second.created);

        let group_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM referral_groups", [], |row| row.get(0))
            .expect("count");
        assert_eq!(group_count, 1);
    }

    #[test]
    fn test_second_batch_from_new_invitees() {
        let conn = test_db();
        let config = RevenueConfig::default();
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        for i in 0..3 {
            eligible_invitee(&conn, referrer, 200 + i);
        }
        try_form_new_batch(&conn, &config, referrer, 1_000).expect("first batch");

        for i in 0..3 {
            eligible_invitee(&conn, referrer, 300 + i);
        }
        let outcome = try_form_new_batch(&conn, &config, referrer, 2_000).expect("second batch");
        assert!(outcome.created);

        let group_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM referral_groups", [], |row| row.get(0))
            .expect("count");
        assert_eq!(group_count, 2);
    }

    #[test]
    fn test_milestones_follow_batches() {
        let conn = test_db();
        // Tiny thresholds so batches of 3 cross tiers quickly.
        let config = RevenueConfig {
            milestones: vec![
                kickback_types::config::MilestoneTier { at: 6, bonus_bps: 200 },
                kickback_types::config::MilestoneTier { at: 3, bonus_bps: 100 },
            ],
            ..RevenueConfig::default()
        };
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");

        for i in 0..3 {
            eligible_invitee(&conn, referrer, 200 + i);
        }
        try_form_new_batch(&conn, &config, referrer, 1_000).expect("first batch");
        let user = users::get(&conn, referrer).expect("get");
        assert_eq!(user.lifetime_referral_count, 3);
        assert_eq!(user.permanent_override_bps, 100);

        for i in 0..3 {
            eligible_invitee(&conn, referrer, 300 + i);
        }
        try_form_new_batch(&conn, &config, referrer, 2_000).expect("second batch");
        let user = users::get(&conn, referrer).expect("get");
        assert_eq!(user.lifetime_referral_count, 6);
        assert_eq!(user.permanent_override_bps, 200);
    }

    #[test]
    fn test_custom_batch_size() {
        let conn = test_db();
        let config = RevenueConfig {
            batch_size: 2,
            ..RevenueConfig::default()
        };
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        eligible_invitee(&conn, referrer, 200);
        eligible_invitee(&conn, referrer, 300);

        let outcome = try_form_new_batch(&conn, &config, referrer, 1_000).expect("attempt");
        assert!(outcome.created);
        let group = outcome.group.expect("group");
        assert_eq!(groups::group_members(&conn, group.id).expect("members").len(), 2);
    }
}
