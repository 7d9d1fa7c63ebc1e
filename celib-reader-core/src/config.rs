use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Zoom limits and defaults for a viewer session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub default_scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_step: f32,
}

impl ViewerConfig {
    pub const DEFAULT_SCALE: f32 = 1.5;
    pub const MIN_SCALE: f32 = 0.5;
    pub const MAX_SCALE: f32 = 3.0;
    pub const ZOOM_STEP: f32 = 0.25;

    /// Parse a JSON config. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ViewerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ViewerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.zoom_step > 0.0) {
            return Err(ViewerError::Config(format!(
                "zoom_step must be positive, got {}",
                self.zoom_step
            )));
        }
        // A config may narrow the zoom range but never widen it
        if !(Self::MIN_SCALE..=Self::MAX_SCALE).contains(&self.min_scale)
            || !(Self::MIN_SCALE..=Self::MAX_SCALE).contains(&self.max_scale)
        {
            return Err(ViewerError::Config(format!(
                "scale range [{}, {}] must lie within [{}, {}]",
                self.min_scale,
                self.max_scale,
                Self::MIN_SCALE,
                Self::MAX_SCALE
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(ViewerError::Config(format!(
                "scale range [{}, {}] is empty",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.default_scale) {
            return Err(ViewerError::Config(format!(
                "default_scale {} is outside [{}, {}]",
                self.default_scale, self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_scale: Self::DEFAULT_SCALE,
            min_scale: Self::MIN_SCALE,
            max_scale: Self::MAX_SCALE,
            zoom_step: Self::ZOOM_STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_scale, 1.5);
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.max_scale, 3.0);
        assert_eq!(config.zoom_step, 0.25);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = ViewerConfig::from_json(r#"{ "max_scale": 2.0 }"#).unwrap();
        assert_eq!(
            config,
            ViewerConfig {
                max_scale: 2.0,
                ..ViewerConfig::default()
            }
        );
    }

    #[test]
    fn rejects_inverted_range() {
        let err = ViewerConfig::from_json(r#"{ "min_scale": 2.0, "max_scale": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn rejects_range_wider_than_hard_limits() {
        let err = ViewerConfig::from_json(r#"{ "min_scale": 0.1, "max_scale": 10.0 }"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
        assert!(ViewerConfig::from_json(r#"{ "max_scale": 3.5 }"#).is_err());
        assert!(ViewerConfig::from_json(r#"{ "min_scale": 0.25 }"#).is_err());
    }

    #[test]
    fn narrowed_range_is_accepted() {
        let config =
            ViewerConfig::from_json(r#"{ "min_scale": 1.0, "max_scale": 2.0 }"#).unwrap();
        assert_eq!(config.clamp_scale(10.0), 2.0);
        assert_eq!(config.clamp_scale(0.1), 1.0);
    }

    #[test]
    fn rejects_default_outside_range() {
        let config = ViewerConfig {
            default_scale: 4.0,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_step() {
        let config = ViewerConfig {
            zoom_step: 0.0,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_scale": 1.0, "zoom_step": 0.5 }}"#).unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.default_scale, 1.0);
        assert_eq!(config.zoom_step, 0.5);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }
}
