//! Commission query functions.

use rusqlite::{Connection, OptionalExtension};

use kickback_types::commission::{Commission, CommissionStatus};
use kickback_types::{CommissionId, Timestamp, UserId};

use crate::{DbError, Result};

/// Insert a commission in `pending` status.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    gross_minor: u64,
    created_at: Timestamp,
) -> Result<CommissionId> {
    conn.execute(
        "INSERT INTO commissions (user_id, gross_minor, created_at)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, gross_minor as i64, created_at as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Raw commission row, before status parsing.
struct CommissionRow {
    id: CommissionId,
    user_id: UserId,
    gross_minor: u64,
    status: String,
    finalized_at: Option<Timestamp>,
    created_at: Timestamp,
}

fn parse_status(raw: &str) -> Result<CommissionStatus> {
    CommissionStatus::parse(raw)
        .ok_or_else(|| DbError::Serialization(format!("unknown commission status '{raw}'")))
}

/// Load one commission.
pub fn get(conn: &Connection, commission_id: CommissionId) -> Result<Commission> {
    let row = conn
        .query_row(
            "SELECT id, user_id, gross_minor, status, finalized_at, created_at
             FROM commissions WHERE id = ?1",
            [commission_id],
            |row| {
                Ok(CommissionRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    gross_minor: row.get::<_, i64>(2)? as u64,
                    status: row.get(3)?,
                    finalized_at: row.get::<_, Option<i64>>(4)?.map(|t| t as u64),
                    created_at: row.get::<_, i64>(5)? as u64,
                })
            },
        )
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("commission {commission_id}")))?;

    Ok(Commission {
        id: row.id,
        user_id: row.user_id,
        gross_minor: row.gross_minor,
        status: parse_status(&row.status)?,
        finalized_at: row.finalized_at,
        created_at: row.created_at,
    })
}

/// Approve a pending commission (external admin/automation transition).
pub fn approve(conn: &Connection, commission_id: CommissionId) -> Result<()> {
    let updated = conn.execute(
        "UPDATE commissions SET status = 'approved' WHERE id = ?1 AND status = 'pending'",
        [commission_id],
    )?;
    if updated == 0 {
        return Err(DbError::Constraint(format!(
            "commission {commission_id} not found or not pending"
        )));
    }
    Ok(())
}

/// Reject a commission. Reachable from pending or approved, never from paid.
pub fn reject(conn: &Connection, commission_id: CommissionId) -> Result<()> {
    let updated = conn.execute(
        "UPDATE commissions SET status = 'rejected'
         WHERE id = ?1 AND status IN ('pending', 'approved')",
        [commission_id],
    )?;
    if updated == 0 {
        return Err(DbError::Constraint(format!(
            "commission {commission_id} not found or not rejectable"
        )));
    }
    Ok(())
}

/// Compare-and-set the finalize timestamp.
///
/// Returns `true` if this call won the finalize (the timestamp was null
/// and is now set), `false` if some other settlement got there first.
/// This single conditional UPDATE is the settlement serialization point.
pub fn finalize_if_unfinalized(
    conn: &Connection,
    commission_id: CommissionId,
    now: Timestamp,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE commissions SET finalized_at = ?2
         WHERE id = ?1 AND finalized_at IS NULL",
        rusqlite::params![commission_id, now as i64],
    )?;
    Ok(updated == 1)
}

/// Advance an approved commission to paid, once payout rows exist.
pub fn mark_paid(conn: &Connection, commission_id: CommissionId) -> Result<()> {
    let updated = conn.execute(
        "UPDATE commissions SET status = 'paid' WHERE id = ?1 AND status = 'approved'",
        [commission_id],
    )?;
    if updated == 0 {
        return Err(DbError::Constraint(format!(
            "commission {commission_id} not found or not approved"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    fn user(conn: &Connection) -> UserId {
        users::insert(conn, None, None, 100).expect("insert user")
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_db();
        let user_id = user(&conn);
        let id = insert(&conn, user_id, 10_000, 1_000).expect("insert");

        let commission = get(&conn, id).expect("get");
        assert_eq!(commission.user_id, user_id);
        assert_eq!(commission.gross_minor, 10_000);
        assert_eq!(commission.status, CommissionStatus::Pending);
        assert_eq!(commission.finalized_at, None);
    }

    #[test]
    fn test_get_missing() {
        let conn = test_db();
        assert!(matches!(get(&conn, 9), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_approve_then_paid() {
        let conn = test_db();
        let id = insert(&conn, user(&conn), 500, 1_000).expect("insert");
        approve(&conn, id).expect("approve");
        assert_eq!(get(&conn, id).expect("get").status, CommissionStatus::Approved);

        mark_paid(&conn, id).expect("mark paid");
        assert_eq!(get(&conn, id).expect("get").status, CommissionStatus::Paid);
    }

    #[test]
    fn test_approve_twice_fails() {
        let conn = test_db();
        let id = insert(&conn, user(&conn), 500, 1_000).expect("insert");
        approve(&conn, id).expect("approve");
        assert!(approve(&conn, id).is_err());
    }

    #[test]
    fn test_reject_not_reachable_from_paid() {
        let conn = test_db();
        let id = insert(&conn, user(&conn), 500, 1_000).expect("insert");
        approve(&conn, id).expect("approve");
        mark_paid(&conn, id).expect("mark paid");
        assert!(reject(&conn, id).is_err());
    }

    #[test]
    fn test_finalize_cas() {
        let conn = test_db();
        let id = insert(&conn, user(&conn), 500, 1_000).expect("insert");

        assert!(finalize_if_unfinalized(&conn, id, 2_000).expect("first finalize"));
        assert!(!finalize_if_unfinalized(&conn, id, 3_000).expect("second finalize"));

        // First timestamp sticks.
        assert_eq!(get(&conn, id).expect("get").finalized_at, Some(2_000));
    }
}
