//! Tunable thresholds for velocity trend classification.
//!
//! The cutoffs separating "stable" from "increasing/decreasing" and the
//! swing magnitude that flags a series as "volatile" are judgment calls,
//! not physics. They live in an explicit config struct with documented
//! defaults instead of magic numbers, and can be overridden from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Net change within this band (percent, either direction) is "stable".
const DEFAULT_STABLE_BAND_PCT: f64 = 10.0;

/// Two consecutive sign-alternating swings each at or beyond this magnitude
/// (percent) classify the series as "volatile".
const DEFAULT_VOLATILE_SWING_PCT: f64 = 25.0;

/// Trend classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub stable_band_pct: f64,
    pub volatile_swing_pct: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            stable_band_pct: DEFAULT_STABLE_BAND_PCT,
            volatile_swing_pct: DEFAULT_VOLATILE_SWING_PCT,
        }
    }
}

/// Errors loading or validating a [`TrendConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid trend config: {0}")]
    Invalid(String),
}

impl TrendConfig {
    /// Parse a config from TOML, falling back to defaults for absent keys.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML, [`ConfigError::Invalid`]
    /// for out-of-range thresholds.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds that would make classification nonsensical.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when a threshold is negative or non-finite,
    /// or when the volatile cutoff sits inside the stable band (a swing
    /// could then be volatile and stable at once).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.stable_band_pct.is_finite() || self.stable_band_pct < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "stable_band_pct must be a non-negative number, got {}",
                self.stable_band_pct
            )));
        }
        if !self.volatile_swing_pct.is_finite() || self.volatile_swing_pct < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "volatile_swing_pct must be a non-negative number, got {}",
                self.volatile_swing_pct
            )));
        }
        if self.volatile_swing_pct < self.stable_band_pct {
            return Err(ConfigError::Invalid(format!(
                "volatile_swing_pct ({}) must not be below stable_band_pct ({})",
                self.volatile_swing_pct, self.stable_band_pct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TrendConfig};

    #[test]
    fn defaults_are_valid() {
        let config = TrendConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stable_band_pct, 10.0);
        assert_eq!(config.volatile_swing_pct, 25.0);
    }

    #[test]
    fn toml_overrides_individual_keys() {
        let config = TrendConfig::from_toml_str("stable_band_pct = 5.0").unwrap();
        assert_eq!(config.stable_band_pct, 5.0);
        assert_eq!(config.volatile_swing_pct, 25.0);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = TrendConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrendConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = TrendConfig::from_toml_str("stable_band_pct = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_threshold_rejected() {
        let err = TrendConfig::from_toml_str("stable_band_pct = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn volatile_below_stable_band_rejected() {
        let err =
            TrendConfig::from_toml_str("stable_band_pct = 30.0\nvolatile_swing_pct = 20.0")
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
