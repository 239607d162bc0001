use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::mot::{MatchingPolicy, DEFAULT_MAX_STALENESS, UNKNOWN_LABEL};
use crate::pipeline::PipelineError;

/// Processing session parameters, adjustable through a JSON file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Processing rate ceiling, frames per second
    pub target_fps: f64,
    /// Frames a track survives without being observed
    pub max_staleness: u64,
    /// Label the recognizer assigns to unidentified subjects
    pub unknown_label: String,
    pub matching: MatchingPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_fps: 10.0,
            max_staleness: DEFAULT_MAX_STALENESS,
            unknown_label: UNKNOWN_LABEL.to_string(),
            matching: MatchingPolicy::Label,
        }
    }
}

impl SessionConfig {
    /// Loads configuration from JSON file. Missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("can't read {}: {}", path.display(), e)))?;
        let config: SessionConfig = serde_json::from_str(&json)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(PipelineError::Config(format!(
                "target_fps must be a positive number, got {}",
                self.target_fps
            )));
        }
        if self.unknown_label.is_empty() {
            return Err(PipelineError::Config("unknown_label must not be empty".to_string()));
        }
        if let MatchingPolicy::LabelIou { min_iou } = self.matching {
            if !(0.0..=1.0).contains(&min_iou) {
                return Err(PipelineError::Config(format!(
                    "min_iou must lie in [0, 1], got {}",
                    min_iou
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.target_fps, 10.0);
        assert_eq!(config.max_staleness, 30);
        assert_eq!(config.unknown_label, "Unknown");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"target_fps":20,"matching":{"kind":"label_iou","min_iou":0.4}}"#).unwrap();
        assert_eq!(config.target_fps, 20.0);
        assert_eq!(config.max_staleness, 30);
        assert_eq!(config.matching, MatchingPolicy::LabelIou { min_iou: 0.4 });
    }

    #[test]
    fn test_validate() {
        let mut config = SessionConfig::default();
        config.target_fps = 0.0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
        config.target_fps = 5.0;
        config.matching = MatchingPolicy::LabelIou { min_iou: 1.5 };
        assert!(config.validate().is_err());
        config.matching = MatchingPolicy::Label;
        config.unknown_label = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join(format!("{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(SessionConfig::load(&path), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{"target_fps": 15, "unknown_label": "stranger"}"#).unwrap();
        let config = SessionConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.target_fps, 15.0);
        assert_eq!(config.unknown_label, "stranger");
    }
}
