//! # kickback-split
//!
//! Pure revenue-split arithmetic: the commission split calculator and the
//! milestone resolver. No persistence, no side effects.
//!
//! ## Modules
//!
//! - [`split`] — Invitee/referrer/platform share computation
//! - [`milestone`] — Lifetime-referral-count → permanent bonus rate

pub mod milestone;
pub mod split;

/// Error types for split computation.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// A rate is outside the valid basis-point range.
    #[error("invalid rates: {0}")]
    InvalidRates(String),

    /// Arithmetic overflow.
    #[error("arithmetic overflow in split calculation")]
    Overflow,
}

/// Convenience result type for split operations.
pub type Result<T> = std::result::Result<T, SplitError>;
