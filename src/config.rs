//! Game tuning
//!
//! Data-driven numbers for the hole, consumption, movement, camera and the
//! physics stand-in. Persisted as JSON in LocalStorage on the web build.
//! Level-specific numbers live in the level descriptor instead.

use serde::{Deserialize, Serialize};

use crate::sim::{CameraTuning, ConsumptionRules, GrowthTuning, MovementTuning, WellTuning};

/// Every tunable the core reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub growth: GrowthTuning,
    pub consumption: ConsumptionRules,
    pub movement: MovementTuning,
    pub camera: CameraTuning,
    pub physics: WellTuning,
}

impl GameConfig {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hole_city_config";

    /// Parse from JSON; missing sections and fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Stored config is invalid ({e}), using defaults"),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Config saved");
                }
                Err(e) => log::warn!("Could not serialize config: {e}"),
            }
        }
    }

    /// Native: read `HOLE_CITY_CONFIG` as a JSON path if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("HOLE_CITY_CONFIG") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Config {path} is invalid ({e}), using defaults");
                Self::default()
            }),
            Err(e) => {
                log::warn!("Could not read config {path} ({e}), using defaults");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ScoreRule;

    #[test]
    fn test_defaults_match_tuned_values() {
        let config = GameConfig::default();
        assert_eq!(config.growth.base_need, 14.0);
        assert_eq!(config.growth.need_factor, 1.35);
        assert_eq!(config.consumption.fit_factor, 0.95);
        assert_eq!(config.consumption.center_factor, 0.35);
        assert_eq!(config.consumption.score_coefficient, 25.0);
        assert_eq!(config.movement.speed, 10.5);
        assert_eq!(config.camera.offset, [14.0, 18.0, 22.0]);
        assert_eq!(config.physics.well_depth, 9.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = GameConfig::default();
        config.consumption.score_rule = ScoreRule::Points;
        config.movement.speed = 7.0;
        let json = config.to_json().unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{ "movement": { "speed": 3.0 } }"#).unwrap();
        assert_eq!(config.movement.speed, 3.0);
        assert_eq!(config.growth, GrowthTuning::default());
        assert_eq!(config.camera.smoothing, 0.08);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(GameConfig::from_json("{ not json").is_err());
        assert!(GameConfig::from_json(r#"{ "growth": { "base_need": "lots" } }"#).is_err());
    }
}
