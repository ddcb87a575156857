//! Commission split computation.
//!
//! A gross commission amount is divided three ways:
//!
//! - **Invitee**: base rate plus any batch and permanent bonuses, capped so
//!   the platform always retains its margin floor
//! - **Referrer**: a fixed share of gross, paid only while a bonus window
//!   is active
//! - **Platform**: the remainder, never negative
//!
//! All rates are basis points (10000 = 100%); all amounts are minor
//! currency units. Shares always sum exactly to gross.

use serde::{Deserialize, Serialize};

use kickback_types::config::RevenueConfig;
use kickback_types::BPS_DENOMINATOR;

use crate::{Result, SplitError};

/// Rate inputs for one split computation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SplitRates {
    /// Base invitee rate.
    pub base_rate_bps: u16,
    /// Temporary batch bonus (zero when no window is active).
    pub batch_bonus_bps: u16,
    /// Permanent milestone bonus of the invitee's referrer.
    pub permanent_bonus_bps: u16,
    /// Referrer override share of gross (zero when no window is active).
    pub referrer_bonus_bps: u16,
    /// Minimum share of gross retained by the platform.
    pub platform_floor_bps: u16,
}

impl SplitRates {
    /// Assemble rates from configuration plus per-commission context.
    ///
    /// `permanent_bonus_bps` is the *referrer's* stored milestone rate and
    /// never expires, so it applies regardless of the window. Only the
    /// batch and referrer components are zeroed when no bonus window is
    /// active.
    pub fn from_config(config: &RevenueConfig, window_active: bool, permanent_bonus_bps: u16) -> Self {
        SplitRates {
            base_rate_bps: config.base_rate_bps,
            batch_bonus_bps: if window_active { config.batch_bonus_bps } else { 0 },
            permanent_bonus_bps,
            referrer_bonus_bps: if window_active { config.referrer_bonus_bps } else { 0 },
            platform_floor_bps: config.platform_floor_bps,
        }
    }
}

/// Result of one split computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSplit {
    pub invitee_minor: u64,
    pub referrer_minor: u64,
    pub platform_minor: u64,
    /// The invitee rate actually applied, after the floor cap.
    pub effective_invitee_bps: u16,
    /// True if the invitee rate was reduced to honor the margin floor.
    pub capped: bool,
    /// True if the referrer share was zeroed to keep the platform share
    /// non-negative.
    pub referrer_zeroed: bool,
}

/// Compute the invitee/referrer/platform split of a gross amount.
///
/// The invitee rate is `base + batch + permanent`, capped at
/// `10000 - platform_floor_bps`. The referrer share is computed on gross
/// independently of the invitee cap, but is zeroed entirely if it would
/// drive the platform share negative.
///
/// # Errors
///
/// - [`SplitError::InvalidRates`] if the floor or referrer rate exceeds 10000 bps
/// - [`SplitError::Overflow`] on arithmetic overflow
pub fn compute_split(gross_minor: u64, rates: &SplitRates) -> Result<CommissionSplit> {
    if u64::from(rates.platform_floor_bps) > BPS_DENOMINATOR {
        return Err(SplitError::InvalidRates(format!(
            "platform floor {} bps exceeds {}",
            rates.platform_floor_bps, BPS_DENOMINATOR
        )));
    }
    if u64::from(rates.referrer_bonus_bps) > BPS_DENOMINATOR {
        return Err(SplitError::InvalidRates(format!(
            "referrer bonus {} bps exceeds {}",
            rates.referrer_bonus_bps, BPS_DENOMINATOR
        )));
    }

    let raw_invitee_bps = u32::from(rates.base_rate_bps)
        + u32::from(rates.batch_bonus_bps)
        + u32::from(rates.permanent_bonus_bps);
    let max_allowed_bps = (BPS_DENOMINATOR as u32) - u32::from(rates.platform_floor_bps);
    let final_invitee_bps = raw_invitee_bps.min(max_allowed_bps);
    let capped = final_invitee_bps != raw_invitee_bps;

    let invitee_minor = gross_minor
        .checked_mul(u64::from(final_invitee_bps))
        .ok_or(SplitError::Overflow)?
        / BPS_DENOMINATOR;

    let mut referrer_minor = gross_minor
        .checked_mul(u64::from(rates.referrer_bonus_bps))
        .ok_or(SplitError::Overflow)?
        / BPS_DENOMINATOR;

    // Margin-floor safety rule: the referrer override must never push the
    // platform share negative.
    let mut referrer_zeroed = false;
    if invitee_minor + referrer_minor > gross_minor {
        referrer_minor = 0;
        referrer_zeroed = true;
    }

    // Platform takes the remainder, so shares sum exactly to gross.
    let platform_minor = gross_minor - invitee_minor - referrer_minor;

    Ok(CommissionSplit {
        invitee_minor,
        referrer_minor,
        platform_minor,
        // max_allowed_bps <= 10000, so the cast is lossless.
        effective_invitee_bps: final_invitee_bps as u16,
        capped,
        referrer_zeroed,
    })
}
