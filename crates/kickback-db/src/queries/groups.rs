//! Referral group query functions.

use rusqlite::{Connection, OptionalExtension};

use kickback_types::referral::ReferralGroup;
use kickback_types::{GroupId, Timestamp, UserId};

use crate::{DbError, Result};

/// Insert a new referral group with its members in one transaction.
///
/// The UNIQUE(referrer_id, invitee_id) constraint on the member table is
/// the atomic exclusivity check: if any invitee already belongs to a group
/// of this referrer the whole insert fails with
/// [`DbError::Constraint`] and nothing is written.
pub fn insert_group(
    conn: &Connection,
    referrer_id: UserId,
    invitee_ids: &[UserId],
    started_at: Timestamp,
    expires_at: Timestamp,
) -> Result<GroupId> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO referral_groups (referrer_id, started_at, expires_at)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![referrer_id, started_at as i64, expires_at as i64],
    )?;
    let group_id = tx.last_insert_rowid();

    for invitee_id in invitee_ids {
        tx.execute(
            "INSERT INTO referral_group_members (group_id, referrer_id, invitee_id)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![group_id, referrer_id, invitee_id],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::Constraint(format!(
                    "invitee {invitee_id} already grouped for referrer {referrer_id}"
                ))
            }
            other => DbError::Sqlite(other),
        })?;
    }

    tx.commit()?;
    Ok(group_id)
}

/// Find the group of `referrer_id` containing `invitee_id` whose window
/// covers `now`, boundaries inclusive.
pub fn active_group_for_pair(
    conn: &Connection,
    referrer_id: UserId,
    invitee_id: UserId,
    now: Timestamp,
) -> Result<Option<ReferralGroup>> {
    let group = conn
        .query_row(
            "SELECT g.id, g.referrer_id, g.started_at, g.expires_at
             FROM referral_groups g
             JOIN referral_group_members m ON m.group_id = g.id
             WHERE g.referrer_id = ?1 AND m.invitee_id = ?2
               AND g.started_at <= ?3 AND ?3 <= g.expires_at
             LIMIT 1",
            rusqlite::params![referrer_id, invitee_id, now as i64],
            |row| {
                Ok(ReferralGroup {
                    id: row.get(0)?,
                    referrer_id: row.get(1)?,
                    started_at: row.get::<_, i64>(2)? as u64,
                    expires_at: row.get::<_, i64>(3)? as u64,
                })
            },
        )
        .optional()?;
    Ok(group)
}

/// List invitees of `referrer_id` that are eligible (own at least one
/// commission at approved or later) and not yet in any of the referrer's
/// groups.
///
/// Ordered oldest-eligibility-first, invitee id as tie-break, so batch
/// selection is deterministic and fair.
pub fn ungrouped_eligible_invitees(
    conn: &Connection,
    referrer_id: UserId,
) -> Result<Vec<(UserId, Timestamp)>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, MIN(c.created_at) AS eligible_at
         FROM users u
         JOIN commissions c ON c.user_id = u.id AND c.status IN ('approved', 'paid')
         WHERE u.referrer_id = ?1
           AND NOT EXISTS (
               SELECT 1 FROM referral_group_members m
               WHERE m.referrer_id = ?1 AND m.invitee_id = u.id
           )
         GROUP BY u.id
         ORDER BY eligible_at ASC, u.id ASC",
    )?;

    let rows = stmt
        .query_map([referrer_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Count all invitees ever batched for a referrer, across all groups.
///
/// This is the referrer's lifetime referral count as witnessed by the
/// group store, used by milestone reconciliation.
pub fn member_count_for_referrer(conn: &Connection, referrer_id: UserId) -> Result<u32> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM referral_group_members WHERE referrer_id = ?1",
        [referrer_id],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

/// List the members of a group.
pub fn group_members(conn: &Connection, group_id: GroupId) -> Result<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT invitee_id FROM referral_group_members
         WHERE group_id = ?1 ORDER BY invitee_id ASC",
    )?;
    let rows = stmt
        .query_map([group_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
