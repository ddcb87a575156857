//! # kickback-referral
//!
//! Referral bonus-window tracking: decides whether a referrer/invitee
//! pair currently sits inside an active bonus window, and groups
//! newly-eligible invitees into fixed-size batches that each open a new
//! window.
//!
//! ## Modules
//!
//! - [`window`] — Active-window membership check
//! - [`batch`] — Batch formation and milestone reconciliation

pub mod batch;
pub mod window;

use kickback_db::DbError;

/// Error types for referral tracking.
#[derive(Debug, thiserror::Error)]
pub enum ReferralError {
    /// Persistence failure. Batch formation must fail loudly rather than
    /// silently skip — a skipped batch is a lost bonus guarantee.
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// A condition that must never hold did (refuse to persist).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience result type for referral operations.
pub type Result<T> = std::result::Result<T, ReferralError>;
