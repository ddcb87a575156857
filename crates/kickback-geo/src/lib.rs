//! # kickback-geo
//!
//! Geo access evaluation for redirect requests: resolves an effective
//! market from request signals and the user's profile, then checks it
//! against a merchant's allow/deny country lists.
//!
//! Pure decision functions — the caller owns audit logging and the
//! block-page/redirect response.
//!
//! ## Modules
//!
//! - [`market`] — Market resolution (override TTL, ip country, home country)
//! - [`decision`] — Allow/deny evaluation with reason codes

pub mod decision;
pub mod market;

pub use decision::{evaluate, DenyReason, GeoDecision};
pub use market::{resolve_market, GeoProfile, MarketSignals, MARKET_OVERRIDE_TTL_SECS};
