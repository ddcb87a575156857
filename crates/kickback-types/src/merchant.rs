//! Merchant geo-restriction rules.

use serde::{Deserialize, Serialize};

use crate::MerchantId;

/// Geo-relevant fields of a merchant offer, read-only from this core.
///
/// Empty lists mean "no restriction of that kind". Country codes are ISO
/// 3166-1 alpha-2 and compared case-insensitively.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MerchantRule {
    pub id: MerchantId,
    pub name: String,
    /// If non-empty, only these markets may reach the offer.
    #[serde(default)]
    pub allow_countries: Vec<String>,
    /// Markets that may never reach the offer. Takes precedence over the
    /// allow-list.
    #[serde(default)]
    pub block_countries: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_is_unrestricted() {
        let rule = MerchantRule::default();
        assert!(rule.allow_countries.is_empty());
        assert!(rule.block_countries.is_empty());
    }
}
