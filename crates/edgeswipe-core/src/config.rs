#![forbid(unsafe_code)]

//! Thresholds and timings for edge-swipe recognition.
//!
//! [`GestureConfig`] is immutable once handed to a coordinator. Screens that
//! only want to tweak a value or two pass a [`GestureConfigOverrides`], which
//! is merged over the defaults and validated in one step.
//!
//! # Loading
//!
//! With the `config-file` feature the config can be loaded from TOML or JSON:
//!
//! ```toml
//! edge_threshold_px = 24.0
//! max_travel_px = 120.0
//! open_animation_ms = 180
//! easing = "ease_out_cubic"
//! ```
//!
//! ```rust,ignore
//! let config = GestureConfig::from_toml_file("edgeswipe.toml")?;
//! let overrides = GestureConfigOverrides::from_json_str(r#"{"cooldown_ms": 500}"#)?;
//! ```
//!
//! # Invariants
//!
//! 1. Every numeric field is finite and strictly positive.
//! 2. `min_completion_distance_px <= max_travel_px`.
//!
//! Both are checked by [`GestureConfig::validate`]; the loaders and
//! [`SwipeCoordinator::new`](crate::coordinator::SwipeCoordinator::new) run it
//! before a config is ever used.

#[cfg(feature = "config-file")]
use std::path::Path;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::animation::Easing;

/// Thresholds and timings for the left-edge swipe.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct GestureConfig {
    /// Touches starting further than this from the left edge are ignored (default: 30px).
    pub edge_threshold_px: f32,
    /// Release distance that always completes the swipe (default: 50px).
    pub min_completion_distance_px: f32,
    /// Release velocity (px/ms) that completes a short flick (default: 0.3).
    pub min_completion_velocity: f32,
    /// Progress is clamped to `[0, max_travel_px]` (default: 100px).
    pub max_travel_px: f32,
    /// Duration of the settle animation after release (default: 200ms).
    #[cfg_attr(
        feature = "config-file",
        serde(rename = "open_animation_ms", with = "duration_ms")
    )]
    pub open_animation: Duration,
    /// Default length of [`temporarily_disable`](crate::coordinator::SwipeCoordinator::temporarily_disable) (default: 300ms).
    #[cfg_attr(feature = "config-file", serde(rename = "cooldown_ms", with = "duration_ms"))]
    pub cooldown: Duration,
    /// Rightward travel needed before a captured touch counts as a swipe (default: 5px).
    pub move_slop_px: f32,
    /// Minimum travel for the velocity rule to apply (default: 20px).
    pub flick_min_distance_px: f32,
    /// Easing curve of the settle animation (default: ease-out).
    pub easing: Easing,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            edge_threshold_px: 30.0,
            min_completion_distance_px: 50.0,
            min_completion_velocity: 0.3,
            max_travel_px: 100.0,
            open_animation: Duration::from_millis(200),
            cooldown: Duration::from_millis(300),
            move_slop_px: 5.0,
            flick_min_distance_px: 20.0,
            easing: Easing::EaseOut,
        }
    }
}

impl GestureConfig {
    /// Check the config invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let px_fields = [
            ("edge_threshold_px", self.edge_threshold_px),
            ("min_completion_distance_px", self.min_completion_distance_px),
            ("min_completion_velocity", self.min_completion_velocity),
            ("max_travel_px", self.max_travel_px),
            ("move_slop_px", self.move_slop_px),
            ("flick_min_distance_px", self.flick_min_distance_px),
        ];
        for (field, value) in px_fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive {
                    field,
                    value: f64::from(value),
                });
            }
        }

        let duration_fields = [
            ("open_animation", self.open_animation),
            ("cooldown", self.cooldown),
        ];
        for (field, value) in duration_fields {
            if value.is_zero() {
                return Err(ConfigError::NonPositive { field, value: 0.0 });
            }
        }

        if self.min_completion_distance_px > self.max_travel_px {
            return Err(ConfigError::DistanceExceedsTravel {
                min_distance_px: self.min_completion_distance_px,
                max_travel_px: self.max_travel_px,
            });
        }
        Ok(())
    }

    /// Merge `overrides` over this config. The result is not validated.
    #[must_use]
    pub fn with_overrides(&self, overrides: &GestureConfigOverrides) -> Self {
        Self {
            edge_threshold_px: overrides.edge_threshold_px.unwrap_or(self.edge_threshold_px),
            min_completion_distance_px: overrides
                .min_completion_distance_px
                .unwrap_or(self.min_completion_distance_px),
            min_completion_velocity: overrides
                .min_completion_velocity
                .unwrap_or(self.min_completion_velocity),
            max_travel_px: overrides.max_travel_px.unwrap_or(self.max_travel_px),
            open_animation: overrides.open_animation.unwrap_or(self.open_animation),
            cooldown: overrides.cooldown.unwrap_or(self.cooldown),
            move_slop_px: overrides.move_slop_px.unwrap_or(self.move_slop_px),
            flick_min_distance_px: overrides
                .flick_min_distance_px
                .unwrap_or(self.flick_min_distance_px),
            easing: overrides.easing.unwrap_or(self.easing),
        }
    }

    /// Load and validate from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load and validate from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Per-screen partial config. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct GestureConfigOverrides {
    pub edge_threshold_px: Option<f32>,
    pub min_completion_distance_px: Option<f32>,
    pub min_completion_velocity: Option<f32>,
    pub max_travel_px: Option<f32>,
    #[cfg_attr(
        feature = "config-file",
        serde(rename = "open_animation_ms", with = "option_duration_ms")
    )]
    pub open_animation: Option<Duration>,
    #[cfg_attr(
        feature = "config-file",
        serde(rename = "cooldown_ms", with = "option_duration_ms")
    )]
    pub cooldown: Option<Duration>,
    pub move_slop_px: Option<f32>,
    pub flick_min_distance_px: Option<f32>,
    pub easing: Option<Easing>,
}

impl GestureConfigOverrides {
    /// Merge over [`GestureConfig::default`] and validate.
    pub fn resolve(&self) -> Result<GestureConfig, ConfigError> {
        let config = GestureConfig::default().with_overrides(self);
        config.validate()?;
        Ok(config)
    }

    /// Parse overrides from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Parse overrides from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when building or loading a gesture configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A threshold or duration was zero, negative, or not finite.
    NonPositive { field: &'static str, value: f64 },
    /// The completion distance can never be reached within the travel range.
    DistanceExceedsTravel {
        min_distance_px: f32,
        max_travel_px: f32,
    },
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::DistanceExceedsTravel {
                min_distance_px,
                max_travel_px,
            } => write!(
                f,
                "min_completion_distance_px ({min_distance_px}) exceeds max_travel_px ({max_travel_px})"
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::NonPositive { .. } | Self::DistanceExceedsTravel { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for millisecond durations
// ---------------------------------------------------------------------------

#[cfg(feature = "config-file")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(feature = "config-file")]
mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub fn serialize<S>(d: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match d {
            Some(d) => {
                serializer.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GestureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.edge_threshold_px, 30.0);
        assert_eq!(config.min_completion_distance_px, 50.0);
        assert_eq!(config.min_completion_velocity, 0.3);
        assert_eq!(config.cooldown, Duration::from_millis(300));
    }

    #[test]
    fn zero_threshold_rejected() {
        let config = GestureConfig {
            edge_threshold_px: 0.0,
            ..GestureConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "edge_threshold_px",
                ..
            }
        ));
    }

    #[test]
    fn nan_velocity_rejected() {
        let config = GestureConfig {
            min_completion_velocity: f32::NAN,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_cooldown_rejected() {
        let config = GestureConfig {
            cooldown: Duration::ZERO,
            ..GestureConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cooldown"));
    }

    #[test]
    fn completion_distance_beyond_travel_rejected() {
        let config = GestureConfig {
            min_completion_distance_px: 150.0,
            max_travel_px: 100.0,
            ..GestureConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DistanceExceedsTravel { .. })
        ));
    }

    #[test]
    fn completion_distance_equal_to_travel_allowed() {
        let config = GestureConfig {
            min_completion_distance_px: 100.0,
            max_travel_px: 100.0,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_only_touch_named_fields() {
        let overrides = GestureConfigOverrides {
            max_travel_px: Some(240.0),
            cooldown: Some(Duration::from_millis(450)),
            ..GestureConfigOverrides::default()
        };
        let config = overrides.resolve().unwrap();
        assert_eq!(config.max_travel_px, 240.0);
        assert_eq!(config.cooldown, Duration::from_millis(450));
        assert_eq!(config.edge_threshold_px, 30.0);
        assert_eq!(config.easing, Easing::EaseOut);
    }

    #[test]
    fn invalid_overrides_fail_resolve() {
        let overrides = GestureConfigOverrides {
            max_travel_px: Some(20.0),
            ..GestureConfigOverrides::default()
        };
        assert!(overrides.resolve().is_err());
    }

    #[test]
    fn error_display_is_readable() {
        let err = ConfigError::DistanceExceedsTravel {
            min_distance_px: 80.0,
            max_travel_px: 60.0,
        };
        assert_eq!(
            err.to_string(),
            "min_completion_distance_px (80) exceeds max_travel_px (60)"
        );
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_round_trip_uses_milliseconds() {
        let config = GestureConfig::from_toml_str(
            "edge_threshold_px = 24.0\nopen_animation_ms = 180\neasing = \"ease_out_cubic\"\n",
        )
        .unwrap();
        assert_eq!(config.edge_threshold_px, 24.0);
        assert_eq!(config.open_animation, Duration::from_millis(180));
        assert_eq!(config.easing, Easing::EaseOutCubic);
        assert_eq!(config.max_travel_px, 100.0);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn json_loader_validates() {
        let err = GestureConfig::from_json_str(r#"{"max_travel_px": 10.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::DistanceExceedsTravel { .. }));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn overrides_from_json() {
        let overrides = GestureConfigOverrides::from_json_str(r#"{"cooldown_ms": 500}"#).unwrap();
        assert_eq!(overrides.cooldown, Some(Duration::from_millis(500)));
        assert_eq!(overrides.max_travel_px, None);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GestureConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn json_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edgeswipe.json");
        std::fs::write(&path, r#"{"edge_threshold_px": 18.0, "cooldown_ms": 120}"#).unwrap();
        let config = GestureConfig::from_json_file(&path).unwrap();
        assert_eq!(config.edge_threshold_px, 18.0);
        assert_eq!(config.cooldown, Duration::from_millis(120));
    }
}
