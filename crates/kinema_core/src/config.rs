//! Motion configuration (kinema.toml)
//!
//! Tuning knobs for the animation engine. Every field has a default, so an
//! empty document is a valid config and hosts override only what they need:
//!
//! ```toml
//! visibility_margin_px = 150.0
//! fade_duration_ticks = 120
//! ```

use crate::error::MotionError;
use serde::{Deserialize, Serialize};

/// Animation engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MotionConfig {
    /// Margin around the viewport inside which a node still counts as
    /// visible, in pixels
    #[serde(default = "default_visibility_margin_px")]
    pub visibility_margin_px: f64,

    /// Angular frequency of the built-in wave interpolators, in radians per
    /// tick
    #[serde(default = "default_wave_frequency")]
    pub wave_frequency: f64,

    /// Fade transition length in clock ticks (3000 ms at a nominal 60 Hz)
    #[serde(default = "default_fade_duration_ticks")]
    pub fade_duration_ticks: u64,
}

fn default_visibility_margin_px() -> f64 {
    100.0
}

fn default_wave_frequency() -> f64 {
    0.05
}

fn default_fade_duration_ticks() -> u64 {
    180
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            visibility_margin_px: default_visibility_margin_px(),
            wave_frequency: default_wave_frequency(),
            fade_duration_ticks: default_fade_duration_ticks(),
        }
    }
}

impl MotionConfig {
    /// Parse a TOML document; absent fields keep their defaults
    pub fn load_str(source: &str) -> Result<Self, MotionError> {
        let config = toml::from_str(source)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = MotionConfig::load_str("").unwrap();
        assert_eq!(config, MotionConfig::default());
        assert_eq!(config.visibility_margin_px, 100.0);
        assert_eq!(config.wave_frequency, 0.05);
        assert_eq!(config.fade_duration_ticks, 180);
    }

    #[test]
    fn test_partial_document_overrides_named_fields_only() {
        let config = MotionConfig::load_str("fade_duration_ticks = 60\n").unwrap();
        assert_eq!(config.fade_duration_ticks, 60);
        assert_eq!(config.visibility_margin_px, 100.0);
        assert_eq!(config.wave_frequency, 0.05);
    }

    #[test]
    fn test_malformed_document_is_a_parse_error() {
        let result = MotionConfig::load_str("fade_duration_ticks = \"fast\"\n");
        assert!(matches!(result, Err(MotionError::ConfigParse(_))));
    }
}
