//! Revenue configuration.
//!
//! Every tunable the settlement core consumes lives here and is injected
//! into the components, never read from ambient global state. All fields
//! have defaults so a partial TOML file (or none at all) is valid.

use serde::{Deserialize, Serialize};

use crate::DAY_SECS;

/// One milestone tier: reaching `at` lifetime referrals unlocks a
/// permanent `bonus_bps` override for the referrer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneTier {
    pub at: u32,
    pub bonus_bps: u16,
}

/// Complete revenue configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevenueConfig {
    /// Base invitee commission rate in basis points.
    #[serde(default = "default_base_rate_bps")]
    pub base_rate_bps: u16,
    /// Temporary bonus added while a referral batch window is active.
    #[serde(default = "default_batch_bonus_bps")]
    pub batch_bonus_bps: u16,
    /// Referrer override share of gross while a window is active.
    #[serde(default = "default_referrer_bonus_bps")]
    pub referrer_bonus_bps: u16,
    /// Minimum share of gross the platform must retain.
    #[serde(default = "default_platform_floor_bps")]
    pub platform_floor_bps: u16,
    /// Invitees per referral batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Bonus window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Method tag stamped on payout rows created by settlement.
    #[serde(default = "default_payout_method")]
    pub payout_method: String,
    /// Milestone threshold table (lifetime count → permanent bps).
    #[serde(default = "default_milestones")]
    pub milestones: Vec<MilestoneTier>,
}

/// Config errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Default for RevenueConfig {
    fn default() -> Self {
        RevenueConfig {
            base_rate_bps: default_base_rate_bps(),
            batch_bonus_bps: default_batch_bonus_bps(),
            referrer_bonus_bps: default_referrer_bonus_bps(),
            platform_floor_bps: default_platform_floor_bps(),
            batch_size: default_batch_size(),
            window_secs: default_window_secs(),
            payout_method: default_payout_method(),
            milestones: default_milestones(),
        }
    }
}

impl RevenueConfig {
    /// Parse a (possibly partial) TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RevenueConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.platform_floor_bps > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "platform_floor_bps {} exceeds 10000",
                self.platform_floor_bps
            )));
        }
        if self.referrer_bonus_bps > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "referrer_bonus_bps {} exceeds 10000",
                self.referrer_bonus_bps
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.window_secs == 0 {
            return Err(ConfigError::Invalid("window_secs must be non-zero".into()));
        }
        Ok(())
    }
}

// Default value functions

fn default_base_rate_bps() -> u16 {
    7_000
}

fn default_batch_bonus_bps() -> u16 {
    500
}

fn default_referrer_bonus_bps() -> u16 {
    500
}

fn default_platform_floor_bps() -> u16 {
    1_500
}

fn default_batch_size() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    90 * DAY_SECS
}

fn default_payout_method() -> String {
    "manual".to_string()
}

fn default_milestones() -> Vec<MilestoneTier> {
    vec![
        MilestoneTier { at: 100, bonus_bps: 500 },
        MilestoneTier { at: 60, bonus_bps: 300 },
        MilestoneTier { at: 30, bonus_bps: 200 },
        MilestoneTier { at: 15, bonus_bps: 100 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RevenueConfig::default();
        assert_eq!(config.base_rate_bps, 7_000);
        assert_eq!(config.batch_bonus_bps, 500);
        assert_eq!(config.referrer_bonus_bps, 500);
        assert_eq!(config.platform_floor_bps, 1_500);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.window_secs, 90 * DAY_SECS);
        assert_eq!(config.milestones.len(), 4);
        config.validate().expect("defaults must validate");
    }

    #[test]
    fn test_partial_toml() {
        let config = RevenueConfig::from_toml_str("base_rate_bps = 6000\n").expect("parse");
        assert_eq!(config.base_rate_bps, 6_000);
        assert_eq!(config.platform_floor_bps, 1_500);
    }

    #[test]
    fn test_milestone_table_toml() {
        let doc = r#"
            [[milestones]]
            at = 10
            bonus_bps = 50
        "#;
        let config = RevenueConfig::from_toml_str(doc).expect("parse");
        assert_eq!(config.milestones, vec![MilestoneTier { at: 10, bonus_bps: 50 }]);
    }

    #[test]
    fn test_floor_out_of_range_rejected() {
        let result = RevenueConfig::from_toml_str("platform_floor_bps = 10001\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = RevenueConfig::from_toml_str("batch_size = 0\n");
        assert!(result.is_err());
    }
}
