//! Milestone resolution: lifetime referral count → permanent bonus rate.
//!
//! The threshold table comes from [`RevenueConfig::milestones`]
//! (configuration, not code) and maps a lifetime count to the permanent
//! basis-point override the referrer has earned. Below the lowest tier the
//! bonus is zero.
//!
//! [`RevenueConfig::milestones`]: kickback_types::config::RevenueConfig

use kickback_types::config::MilestoneTier;

/// Resolve the permanent bonus rate for a lifetime referral count.
///
/// Returns the bonus of the highest tier whose threshold the count has
/// reached, or 0 when no tier matches. Monotonic non-decreasing in
/// `lifetime_count` for any table whose bonuses grow with thresholds.
pub fn resolve_permanent_bps(lifetime_count: u32, table: &[MilestoneTier]) -> u16 {
    table
        .iter()
        .filter(|tier| lifetime_count >= tier.at)
        .max_by_key(|tier| tier.at)
        .map(|tier| tier.bonus_bps)
        .unwrap_or(0)
}
