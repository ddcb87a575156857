//! Allow/deny evaluation against merchant country rules.

use serde::{Deserialize, Serialize};

use kickback_types::merchant::MerchantRule;
use kickback_types::Timestamp;

use crate::market::{normalize_country, resolve_market, GeoProfile, MarketSignals};

/// Why a redirect was denied. Surfaced to the end user for transparency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    UnknownMarket,
    BlockedCountry,
    NotInAllowList,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::UnknownMarket => "unknown_market",
            DenyReason::BlockedCountry => "blocked_country",
            DenyReason::NotInAllowList => "not_in_allow_list",
        }
    }
}

/// The evaluation result, structured so the caller can audit-log it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoDecision {
    /// The IP-derived country as received, normalized when recognized.
    pub ip_country: Option<String>,
    pub resolved_market: Option<String>,
    pub allowed: bool,
    pub reason: Option<DenyReason>,
}

/// Evaluate whether a visitor may reach a merchant offer.
///
/// Deny rules, in order: unknown market; market on the block-list; a
/// non-empty allow-list not containing the market. The block-list takes
/// precedence when a market appears on both lists. Comparison is
/// case-insensitive (everything normalizes to uppercase).
pub fn evaluate(
    signals: &MarketSignals,
    profile: &GeoProfile,
    rule: &MerchantRule,
    now: Timestamp,
) -> GeoDecision {
    let ip_country = signals
        .ip_country
        .as_deref()
        .map(|raw| normalize_country(raw).unwrap_or_else(|| raw.to_string()));
    let resolved_market = resolve_market(signals, profile, now);

    let denial = match &resolved_market {
        None => Some(DenyReason::UnknownMarket),
        Some(market) => {
            let blocked = rule
                .block_countries
                .iter()
                .any(|c| normalize_country(c).as_deref() == Some(market));
            let allow_listed = rule
                .allow_countries
                .iter()
                .any(|c| normalize_country(c).as_deref() == Some(market));

            if blocked {
                Some(DenyReason::BlockedCountry)
            } else if !rule.allow_countries.is_empty() && !allow_listed {
                Some(DenyReason::NotInAllowList)
            } else {
                None
            }
        }
    };

    if let Some(reason) = denial {
        tracing::debug!(
            merchant = %rule.name,
            market = resolved_market.as_deref().unwrap_or("unknown"),
            reason = reason.as_str(),
            "redirect denied"
        );
    }

    GeoDecision {
        ip_country,
        resolved_market,
        allowed: denial.is_none(),
        reason: denial,
    }
}
