//! # kickback-settle
//!
//! The commission settlement engine: converts one approved commission
//! into payout obligations with a deterministic revenue split, exactly
//! once per commission.
//!
//! ## Modules
//!
//! - [`engine`] — The `settle` entry point and its result types

pub mod engine;

pub use engine::{settle, SettlementOutcome, SettlementResult, SkipReason};

use kickback_db::DbError;
use kickback_split::SplitError;
use kickback_types::CommissionId;

/// Error types for settlement.
#[derive(Debug, thiserror::Error)]
pub enum SettleError {
    /// The referenced commission does not exist. Definite error, not
    /// retried automatically.
    #[error("commission not found: {0}")]
    NotFound(CommissionId),

    /// Persistence failure. Retryable: the finalize guard makes blind
    /// retries safe.
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// Split computation failure.
    #[error("split error: {0}")]
    Split(#[from] SplitError),

    /// A condition that must never hold did (refuse to persist).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience result type for settlement operations.
pub type Result<T> = std::result::Result<T, SettleError>;
