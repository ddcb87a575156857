//! Commission settlement.
//!
//! Settlement performs the `APPROVED → PAID` transition: it loads the
//! commission, consults the referral window tracker, computes the revenue
//! split, writes payout obligations, and finalizes the commission — all
//! safe to re-invoke any number of times.
//!
//! The idempotency guard is the nullable `finalized_at` timestamp,
//! claimed with a conditional UPDATE inside the same transaction that
//! writes the payout rows. Two racing settles of one commission cannot
//! both pay: the loser's conditional UPDATE matches zero rows and its
//! transaction rolls back.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use kickback_db::queries::{commissions, payouts, users};
use kickback_db::DbError;
use kickback_split::split::{compute_split, CommissionSplit, SplitRates};
use kickback_types::commission::CommissionStatus;
use kickback_types::config::RevenueConfig;
use kickback_types::{CommissionId, Timestamp, UserId};

use crate::{Result, SettleError};

/// Why a settlement call was a no-op. Expected conditions, not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotApproved,
    AlreadyFinalized,
    ZeroGross,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotApproved => "not_approved",
            SkipReason::AlreadyFinalized => "already_finalized",
            SkipReason::ZeroGross => "zero_gross",
        }
    }
}

/// Structured result of a completed settlement, enough for the caller to
/// audit-log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementResult {
    pub commission_id: CommissionId,
    pub invitee_id: UserId,
    pub referrer_id: Option<UserId>,
    pub window_active: bool,
    pub split: CommissionSplit,
    pub finalized: bool,
}

/// Outcome of a `settle` call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SettlementOutcome {
    Settled(SettlementResult),
    Skipped { reason: SkipReason },
}

impl SettlementOutcome {
    fn skipped(reason: SkipReason) -> Self {
        SettlementOutcome::Skipped { reason }
    }
}

/// Settle one commission.
///
/// Idempotent: re-invocation after a crash or a duplicate trigger
/// returns `Skipped(already_finalized)` without creating payout rows.
///
/// # Errors
///
/// - [`SettleError::NotFound`] if the commission id does not exist
/// - [`SettleError::Db`] on persistence failure (retryable)
/// - [`SettleError::InvariantViolation`] if the computed split does not
///   conserve the gross amount (never persisted)
pub fn settle(
    conn: &Connection,
    config: &RevenueConfig,
    commission_id: CommissionId,
    now: Timestamp,
) -> Result<SettlementOutcome> {
    let commission = commissions::get(conn, commission_id).map_err(|e| match e {
        DbError::NotFound(_) => SettleError::NotFound(commission_id),
        other => SettleError::Db(other),
    })?;

    // The finalize guard is checked before the status guard: a settled
    // commission is already PAID, and re-invocations must report the
    // idempotency skip, not a state complaint.
    if commission.finalized_at.is_some() {
        tracing::debug!(commission_id, "skip: already finalized");
        return Ok(SettlementOutcome::skipped(SkipReason::AlreadyFinalized));
    }
    if commission.status != CommissionStatus::Approved {
        tracing::debug!(commission_id, status = commission.status.as_str(), "skip: not approved");
        return Ok(SettlementOutcome::skipped(SkipReason::NotApproved));
    }

    // A zero-value commission is finalized without payout rows so it is
    // never reprocessed.
    if commission.gross_minor == 0 {
        let won = commissions::finalize_if_unfinalized(conn, commission_id, now)?;
        let reason = if won { SkipReason::ZeroGross } else { SkipReason::AlreadyFinalized };
        tracing::info!(commission_id, reason = reason.as_str(), "zero-gross commission finalized");
        return Ok(SettlementOutcome::skipped(reason));
    }

    let invitee_id = commission.user_id;
    let referrer_id = users::referrer_of(conn, invitee_id)?;

    let window_active = match referrer_id {
        Some(referrer) => active_window_flag(conn, referrer, invitee_id, now)?,
        None => false,
    };

    // The permanent bonus is the referrer's milestone rate, not the
    // invitee's own: the override rewards the referrer's tier.
    let permanent_bonus_bps = match referrer_id {
        Some(referrer) => users::get(conn, referrer)?.permanent_override_bps,
        None => 0,
    };

    let rates = SplitRates::from_config(config, window_active, permanent_bonus_bps);
    let split = compute_split(commission.gross_minor, &rates)?;

    if split.invitee_minor + split.referrer_minor + split.platform_minor != commission.gross_minor {
        return Err(SettleError::InvariantViolation(format!(
            "split of commission {commission_id} does not conserve gross"
        )));
    }

    let detail_prefix = payouts::commission_detail_prefix(commission_id);

    // Payout rows, the finalize compare-and-set, and the status advance
    // are one atomic unit.
    let tx = conn.unchecked_transaction().map_err(DbError::Sqlite)?;

    if !commissions::finalize_if_unfinalized(&tx, commission_id, now)? {
        // Lost the race to another settlement.
        drop(tx);
        tracing::debug!(commission_id, "skip: finalized concurrently");
        return Ok(SettlementOutcome::skipped(SkipReason::AlreadyFinalized));
    }

    payouts::insert(
        &tx,
        invitee_id,
        split.invitee_minor,
        &config.payout_method,
        &format!("{detail_prefix}invitee share"),
        now,
    )?;

    if window_active && split.referrer_minor > 0 {
        if let Some(referrer) = referrer_id {
            payouts::insert(
                &tx,
                referrer,
                split.referrer_minor,
                &config.payout_method,
                &format!("{detail_prefix}referral override"),
                now,
            )?;
        }
    }

    commissions::mark_paid(&tx, commission_id)?;
    tx.commit().map_err(DbError::Sqlite)?;

    tracing::info!(
        commission_id,
        invitee_id,
        referrer_id,
        window_active,
        gross = commission.gross_minor,
        invitee_share = split.invitee_minor,
        referrer_share = split.referrer_minor,
        platform_share = split.platform_minor,
        capped = split.capped,
        "commission settled"
    );

    Ok(SettlementOutcome::Settled(SettlementResult {
        commission_id,
        invitee_id,
        referrer_id,
        window_active,
        split,
        finalized: true,
    }))
}

fn active_window_flag(
    conn: &Connection,
    referrer: UserId,
    invitee: UserId,
    now: Timestamp,
) -> Result<bool> {
    use kickback_referral::ReferralError;
    kickback_referral::window::is_window_active(conn, referrer, invitee, now).map_err(|e| match e {
        ReferralError::Db(db) => SettleError::Db(db),
        ReferralError::InvariantViolation(msg) => SettleError::InvariantViolation(msg),
    })
}
