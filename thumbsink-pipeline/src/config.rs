//! Typed pipeline configuration.
//!
//! Configuration is a plain struct with named fields; there is no dynamic
//! property table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default maximum output rate in frames per second.
pub const DEFAULT_MAX_RATE: u32 = 1;

/// Default numbered filename template.
pub const DEFAULT_NAMING_TEMPLATE: &str = "thumb-%05d.jpg";

/// Rate reducer parameters. Immutable once the pipeline is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Only ever drop frames; never duplicate or interpolate to fill gaps.
    pub drop_only: bool,
    /// Maximum output rate in frames per second.
    ///
    /// Must agree with the enforcer's required rate (1 fps) or the pipeline
    /// produces no output.
    pub max_rate: u32,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            drop_only: true,
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}

/// Still encoder parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StillEncoderConfig {
    /// JPEG quality (1-100).
    pub quality: u8,
}

impl Default for StillEncoderConfig {
    fn default() -> Self {
        Self { quality: 85 }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Suppress the per-frame diagnostic line from the observation probe.
    ///
    /// Readable and writable at any time; has no effect on topology or on
    /// the frame counter itself.
    pub silent: bool,
    /// Directory the numbered files are written into. Never created by the
    /// pipeline; it must already exist by the time the first frame arrives.
    pub output_dir: PathBuf,
    /// Numbered filename template, e.g. `thumb-%05d.jpg`.
    pub naming_template: String,
    /// First file index.
    pub start_index: u64,
    /// Rate reducer parameters.
    pub rate: RateConfig,
    /// Still encoder parameters.
    pub encoder: StillEncoderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            silent: false,
            output_dir: PathBuf::from("."),
            naming_template: DEFAULT_NAMING_TEMPLATE.to_string(),
            start_index: 0,
            rate: RateConfig::default(),
            encoder: StillEncoderConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_element_defaults() {
        let config = PipelineConfig::default();
        assert!(!config.silent);
        assert_eq!(config.naming_template, "thumb-%05d.jpg");
        assert_eq!(config.start_index, 0);
        assert!(config.rate.drop_only);
        assert_eq!(config.rate.max_rate, 1);
        assert_eq!(config.encoder.quality, 85);
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = PipelineConfig {
            silent: true,
            start_index: 7,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
