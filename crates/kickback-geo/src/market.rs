//! Market resolution.
//!
//! Priority, highest first:
//!
//! 1. The user's self-declared current market, if set within the last
//!    24 hours (strictly: `0 <= now - set_at <= 24h`; a timestamp in the
//!    future is clock skew and invalidates the override)
//! 2. The request's IP-derived country code, if recognized
//! 3. The user's home country
//!
//! Unknown otherwise. All codes normalize to uppercase ISO 3166-1 alpha-2.

use serde::{Deserialize, Serialize};

use kickback_types::referral::UserReferral;
use kickback_types::{Timestamp, DAY_SECS};

/// How long a self-declared market override is honored.
pub const MARKET_OVERRIDE_TTL_SECS: u64 = DAY_SECS;

/// Per-request signals derived by the redirect handler.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MarketSignals {
    /// Country code from the IP-geolocation header, as received.
    pub ip_country: Option<String>,
}

/// Geo-relevant snapshot of the visiting user's profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeoProfile {
    pub home_country: Option<String>,
    pub current_market: Option<String>,
    pub current_market_set_at: Option<Timestamp>,
}

impl From<&UserReferral> for GeoProfile {
    fn from(user: &UserReferral) -> Self {
        GeoProfile {
            home_country: user.home_country.clone(),
            current_market: user.current_market.clone(),
            current_market_set_at: user.current_market_set_at,
        }
    }
}

/// Normalize a raw country code: two ASCII letters, uppercased.
/// Anything else is unrecognized.
pub fn normalize_country(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() == 2 && trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}

/// Resolve the effective market for a request, or `None` when unknown.
pub fn resolve_market(
    signals: &MarketSignals,
    profile: &GeoProfile,
    now: Timestamp,
) -> Option<String> {
    if let (Some(market), Some(set_at)) = (&profile.current_market, profile.current_market_set_at) {
        if set_at <= now && now - set_at <= MARKET_OVERRIDE_TTL_SECS {
            if let Some(normalized) = normalize_country(market) {
                return Some(normalized);
            }
        }
    }

    if let Some(ip_country) = &signals.ip_country {
        if let Some(normalized) = normalize_country(ip_country) {
            return Some(normalized);
        }
    }

    profile.home_country.as_deref().and_then(normalize_country)
}
