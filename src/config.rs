//! Engine configuration.
//!
//! The constants are the production values baked into the mini-app. The
//! [`EngineConfig`] struct carries the same values at runtime so tests and
//! the JS shell can shrink them (for example a 10 second training session
//! on a staging build).

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Maximum number of pet slots that may exist at once.
pub const MAX_PET_SLOTS: usize = 3;

/// Length of one training session: 24 hours.
pub const TRAINING_DURATION_MS: u64 = 86_400_000;

/// Countdown refresh cadence while any session is live.
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// The route every deep link collapses into.
pub const CANONICAL_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub max_pet_slots: usize,
    pub training_duration_ms: u64,
    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_pet_slots: MAX_PET_SLOTS,
            training_duration_ms: TRAINING_DURATION_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config. Missing fields keep their
    /// production defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pet_slots == 0 {
            return Err(EngineError::Config("max_pet_slots must be at least 1".into()));
        }
        if self.training_duration_ms == 0 {
            return Err(EngineError::Config("training_duration_ms must be positive".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(EngineError::Config("tick_interval_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_pet_slots, 3);
        assert_eq!(cfg.training_duration_ms, 86_400_000);
        assert_eq!(cfg.tick_interval_ms, 1_000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r#"{"trainingDurationMs": 10000}"#).unwrap();
        assert_eq!(cfg.training_duration_ms, 10_000);
        assert_eq!(cfg.max_pet_slots, MAX_PET_SLOTS);
    }

    #[test]
    fn zero_values_rejected() {
        assert!(EngineConfig::from_json(r#"{"maxPetSlots": 0}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"trainingDurationMs": 0}"#).is_err());
        assert!(EngineConfig::from_json("not json").is_err());
    }
}
