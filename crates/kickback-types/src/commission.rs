//! Commission and payout structures.

use serde::{Deserialize, Serialize};

use crate::{CommissionId, PayoutId, Timestamp, UserId};

/// Lifecycle status of a commission.
///
/// Settlement only ever acts on `Approved`; `Rejected` is reachable from
/// `Pending` or `Approved` but never from `Paid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
}

impl CommissionStatus {
    /// The stable text form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Approved => "approved",
            CommissionStatus::Paid => "paid",
            CommissionStatus::Rejected => "rejected",
        }
    }

    /// Parse the stored text form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CommissionStatus::Pending),
            "approved" => Some(CommissionStatus::Approved),
            "paid" => Some(CommissionStatus::Paid),
            "rejected" => Some(CommissionStatus::Rejected),
            _ => None,
        }
    }
}

/// A single earned amount owed to a user.
///
/// `finalized_at` is the settlement idempotency guard: once set, the
/// commission must never be settled again.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Commission {
    pub id: CommissionId,
    pub user_id: UserId,
    /// Gross amount in minor currency units (cents).
    pub gross_minor: u64,
    pub status: CommissionStatus,
    pub finalized_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Status of a payout obligation, advanced by the external disbursement
/// process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Paid,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PayoutStatus::Pending),
            "processing" => Some(PayoutStatus::Processing),
            "paid" => Some(PayoutStatus::Paid),
            "failed" => Some(PayoutStatus::Failed),
            _ => None,
        }
    }
}

/// A pending disbursement owed to one user, produced by settlement.
///
/// The `detail` text embeds the originating commission id so a human
/// operator can audit and duplicate-detect downstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    pub user_id: UserId,
    pub amount_minor: u64,
    /// Payout method/provider tag ("manual", "wallet", ...).
    pub method: String,
    pub status: PayoutStatus,
    pub detail: String,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_status_round_trip() {
        for status in [
            CommissionStatus::Pending,
            CommissionStatus::Approved,
            CommissionStatus::Paid,
            CommissionStatus::Rejected,
        ] {
            assert_eq!(CommissionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CommissionStatus::parse("settled"), None);
    }

    #[test]
    fn test_payout_status_round_trip() {
        for status in [
            PayoutStatus::Pending,
            PayoutStatus::Processing,
            PayoutStatus::Paid,
            PayoutStatus::Failed,
        ] {
            assert_eq!(PayoutStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PayoutStatus::parse(""), None);
    }
}
