//! # kickback-types
//!
//! Shared domain types used across the Kickback workspace: commissions,
//! payouts, referral groups, merchant geo rules, and the revenue
//! configuration injected into every component.

pub mod commission;
pub mod config;
pub mod merchant;
pub mod referral;

/// Common row-id aliases.
pub type UserId = i64;
pub type CommissionId = i64;
pub type PayoutId = i64;
pub type GroupId = i64;
pub type MerchantId = i64;

/// Unix epoch seconds.
pub type Timestamp = u64;

/// Basis-point denominator (10000 bps = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Minor units per major currency unit (cents per dollar).
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// Seconds in one day.
pub const DAY_SECS: u64 = 24 * 3600;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_denominator() {
        assert_eq!(BPS_DENOMINATOR, 10_000);
    }

    #[test]
    fn test_day_secs() {
        assert_eq!(DAY_SECS, 86_400);
    }
}
