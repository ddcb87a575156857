//! Active-window membership check.

use rusqlite::Connection;

use kickback_db::queries::groups;
use kickback_types::referral::ReferralGroup;
use kickback_types::{Timestamp, UserId};

use crate::Result;

/// Find the bonus window covering `now` for a referrer/invitee pair.
///
/// An invitee belongs to at most one group per referrer, so this is a
/// membership plus inclusive date-range check.
pub fn active_window(
    conn: &Connection,
    referrer_id: UserId,
    invitee_id: UserId,
    now: Timestamp,
) -> Result<Option<ReferralGroup>> {
    Ok(groups::active_group_for_pair(conn, referrer_id, invitee_id, now)?)
}

/// Whether a bonus window is currently active for the pair.
pub fn is_window_active(
    conn: &Connection,
    referrer_id: UserId,
    invitee_id: UserId,
    now: Timestamp,
) -> Result<bool> {
    Ok(active_window(conn, referrer_id, invitee_id, now)?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickback_db::queries::{groups, users};

    fn test_db() -> Connection {
        kickback_db::open_memory().expect("open test db")
    }

    #[test]
    fn test_no_group_means_inactive() {
        let conn = test_db();
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        let invitee = users::insert(&conn, Some(referrer), None, 200).expect("invitee");

        assert!(!is_window_active(&conn, referrer, invitee, 1_500).expect("check"));
    }

    #[test]
    fn test_window_active_exactly_within_bounds() {
        let conn = test_db();
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        let invitee = users::insert(&conn, Some(referrer), None, 200).expect("invitee");
        groups::insert_group(&conn, referrer, &[invitee], 1_000, 2_000).expect("group");

        assert!(!is_window_active(&conn, referrer, invitee, 999).expect("before"));
        assert!(is_window_active(&conn, referrer, invitee, 1_000).expect("start"));
        assert!(is_window_active(&conn, referrer, invitee, 2_000).expect("end"));
        assert!(!is_window_active(&conn, referrer, invitee, 2_001).expect("after"));
    }

    #[test]
    fn test_other_referrers_window_does_not_count() {
        let conn = test_db();
        let referrer = users::insert(&conn, None, None, 100).expect("referrer");
        let other = users::insert(&conn, None, None, 101).expect("other");
        let invitee = users::insert(&conn, Some(referrer), None, 200).expect("invitee");
        groups::insert_group(&conn, referrer, &[invitee], 1_000, 2_000).expect("group");

        assert!(!is_window_active(&conn, other, invitee, 1_500).expect("check"));
    }
}
