//! Host-tunable visibility thresholds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CITY_MAX_DISTANCE, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE,
    DEFAULT_MIN_ELEVATION_ANGLE, DEFAULT_MOVEMENT_THRESHOLD,
};
use crate::errors::ConfigError;

/// Numeric parameters exposed to the host application.
///
/// Missing fields in a JSON document take their default values, so a
/// preferences file holding only `min_elevation_angle` is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Lowest apparent elevation (as a slope) at which a target counts as visible.
    pub min_elevation_angle: f64,
    /// Closest reported distance (meters).
    pub min_distance: f64,
    /// Furthest reported distance (meters).
    pub max_distance: f64,
    /// Settlements beyond this distance are hidden (meters).
    pub city_max_distance: f64,
    /// Observer movement below this is ignored by
    /// `update_observer_if_moved` (meters).
    pub movement_threshold: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            min_elevation_angle: DEFAULT_MIN_ELEVATION_ANGLE,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            city_max_distance: DEFAULT_CITY_MAX_DISTANCE,
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
        }
    }
}

impl VisibilityConfig {
    /// Check every field is finite and non-negative and the distance band is ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("min_elevation_angle", self.min_elevation_angle),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("city_max_distance", self.city_max_distance),
            ("movement_threshold", self.movement_threshold),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.min_distance > self.max_distance {
            return Err(ConfigError::Invalid(format!(
                "min_distance ({}) exceeds max_distance ({})",
                self.min_distance, self.max_distance
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a preferences file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Persist to a preferences file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VisibilityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_distance, 400_000.0);
        assert_eq!(config.city_max_distance, 100_000.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = VisibilityConfig::from_json_str(r#"{"min_elevation_angle": 0.004}"#).unwrap();
        assert_eq!(config.min_elevation_angle, 0.004);
        assert_eq!(config.min_distance, DEFAULT_MIN_DISTANCE);
        assert_eq!(config.movement_threshold, DEFAULT_MOVEMENT_THRESHOLD);
    }

    #[test]
    fn test_rejects_inverted_band() {
        let json = r#"{"min_distance": 5000.0, "max_distance": 1000.0}"#;
        assert!(matches!(
            VisibilityConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_negative_angle() {
        let config = VisibilityConfig {
            min_elevation_angle: -0.01,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            VisibilityConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "skyline-config-{}.json",
            std::process::id()
        ));
        let config = VisibilityConfig {
            min_elevation_angle: 0.002,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = VisibilityConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let path = Path::new("/nonexistent/skyline/config.json");
        assert!(matches!(
            VisibilityConfig::load(path),
            Err(ConfigError::Io(_))
        ));
    }
}
