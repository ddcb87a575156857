//! User query functions (referral graph and geo profile fields).

use rusqlite::{Connection, OptionalExtension};

use kickback_types::referral::UserReferral;
use kickback_types::{Timestamp, UserId};

use crate::{DbError, Result};

/// Insert a user, optionally attached to a referrer.
pub fn insert(
    conn: &Connection,
    referrer_id: Option<UserId>,
    home_country: Option<&str>,
    created_at: Timestamp,
) -> Result<UserId> {
    conn.execute(
        "INSERT INTO users (referrer_id, home_country, created_at)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![referrer_id, home_country, created_at as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Load a user's referral-relevant fields.
pub fn get(conn: &Connection, user_id: UserId) -> Result<UserReferral> {
    conn.query_row(
        "SELECT id, referrer_id, lifetime_referral_count, permanent_override_bps,
                home_country, current_market, current_market_set_at, created_at
         FROM users WHERE id = ?1",
        [user_id],
        |row| {
            Ok(UserReferral {
                id: row.get(0)?,
                referrer_id: row.get(1)?,
                lifetime_referral_count: row.get::<_, i64>(2)? as u32,
                permanent_override_bps: row.get::<_, i64>(3)? as u16,
                home_country: row.get(4)?,
                current_market: row.get(5)?,
                current_market_set_at: row.get::<_, Option<i64>>(6)?.map(|t| t as u64),
                created_at: row.get::<_, i64>(7)? as u64,
            })
        },
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("user {user_id}")))
}

/// Resolve the referrer of a user, if any.
pub fn referrer_of(conn: &Connection, user_id: UserId) -> Result<Option<UserId>> {
    conn.query_row("SELECT referrer_id FROM users WHERE id = ?1", [user_id], |row| {
        row.get(0)
    })
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("user {user_id}")))
}

/// Set the user's self-declared current market and stamp when it was set.
/// The market is honored for 24 hours from `now`.
pub fn set_current_market(
    conn: &Connection,
    user_id: UserId,
    market: &str,
    now: Timestamp,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE users SET current_market = ?2, current_market_set_at = ?3 WHERE id = ?1",
        rusqlite::params![user_id, market, now as i64],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("user {user_id}")));
    }
    Ok(())
}

/// Raise a referrer's milestone fields to the given values.
///
/// Writes are monotonic by construction: both fields only move up via
/// MAX, so a stale re-evaluation can never lower either one, and the
/// reconciliation that calls this is safe to repeat.
pub fn raise_milestone(
    conn: &Connection,
    user_id: UserId,
    lifetime_count: u32,
    resolved_bps: u16,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE users
         SET lifetime_referral_count = MAX(lifetime_referral_count, ?2),
             permanent_override_bps = MAX(permanent_override_bps, ?3)
         WHERE id = ?1",
        rusqlite::params![user_id, lifetime_count as i64, resolved_bps as i64],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("user {user_id}")));
    }
    Ok(())
}
