//! Payout query functions.

use rusqlite::Connection;

use kickback_types::commission::{Payout, PayoutStatus};
use kickback_types::{CommissionId, PayoutId, Timestamp, UserId};

use crate::{DbError, Result};

/// Build the audit detail prefix for payouts originating from a commission.
///
/// Every payout row created by settlement starts its detail text with this
/// prefix so operators can trace and duplicate-detect by commission id.
pub fn commission_detail_prefix(commission_id: CommissionId) -> String {
    format!("commission:{commission_id}:")
}

/// Insert a payout obligation in `pending` status.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    amount_minor: u64,
    method: &str,
    detail: &str,
    created_at: Timestamp,
) -> Result<PayoutId> {
    conn.execute(
        "INSERT INTO payouts (user_id, amount_minor, method, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![user_id, amount_minor as i64, method, detail, created_at as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

/// List payouts owed to one user, oldest first.
pub fn list_for_user(conn: &Connection, user_id: UserId) -> Result<Vec<Payout>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, amount_minor, method, status, detail, created_at
         FROM payouts WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;

    let rows = stmt
        .query_map([user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)? as u64,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)? as u64,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, user_id, amount_minor, method, status_text, detail, created_at)| {
            let status = PayoutStatus::parse(&status_text).ok_or_else(|| {
                DbError::Serialization(format!("unknown payout status '{status_text}'"))
            })?;
            Ok(Payout {
                id,
                user_id,
                amount_minor,
                method,
                status,
                detail,
                created_at,
            })
        })
        .collect()
}

/// Count payout rows originating from a commission (duplicate detection).
pub fn count_for_commission(conn: &Connection, commission_id: CommissionId) -> Result<u32> {
    let pattern = format!("{}%", commission_detail_prefix(commission_id));
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM payouts WHERE detail LIKE ?1",
        [pattern],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

/// Advance a payout's status (external disbursement process).
pub fn set_status(conn: &Connection, payout_id: PayoutId, status: PayoutStatus) -> Result<()> {
    let updated = conn.execute(
        "UPDATE payouts SET status = ?2 WHERE id = ?1",
        rusqlite::params![payout_id, status.as_str()],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("payout {payout_id}")));
    }
    Ok(())
}
