//! Stage capability registry.
//!
//! The pipeline does not construct stages directly; it asks the registry for
//! each required capability, so a hosting environment that lacks one fails
//! construction cleanly with [`PipelineError::StageCreation`].

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::stage::Stage;
use crate::stages::{FileSink, FormatNormalizer, RateEnforcer, RateReducer, StillEncoder};
use std::collections::HashMap;
use std::fmt;

/// The processing capabilities the pipeline requires, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageCapability {
    /// Convert arbitrary raw layouts to the canonical decodable layout.
    FormatNormalize,
    /// Drop frames down to the target rate.
    RateReduce,
    /// Enforce the exact output rate contract.
    RateEnforce,
    /// Compress raw frames into still images.
    StillEncode,
    /// Write numbered files.
    FileSink,
}

impl StageCapability {
    /// All capabilities in the fixed chain order.
    pub const ALL: [StageCapability; 5] = [
        StageCapability::FormatNormalize,
        StageCapability::RateReduce,
        StageCapability::RateEnforce,
        StageCapability::StillEncode,
        StageCapability::FileSink,
    ];

    /// Stable name of the capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageCapability::FormatNormalize => "format-normalize",
            StageCapability::RateReduce => "rate-reduce",
            StageCapability::RateEnforce => "rate-enforce",
            StageCapability::StillEncode => "still-encode",
            StageCapability::FileSink => "file-sink",
        }
    }
}

impl fmt::Display for StageCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factory producing a stage from the pipeline configuration.
pub type StageFactory = Box<dyn Fn(&PipelineConfig) -> Result<Box<dyn Stage>> + Send + Sync>;

/// Registry mapping capabilities to stage factories.
pub struct StageRegistry {
    factories: HashMap<StageCapability, StageFactory>,
}

impl StageRegistry {
    /// An empty registry with no capabilities.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry providing every built-in stage.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(StageCapability::FormatNormalize, |_| {
            Ok(Box::new(FormatNormalizer::new()))
        });
        registry.register(StageCapability::RateReduce, |config| {
            Ok(Box::new(RateReducer::new(config.rate.clone())?))
        });
        registry.register(StageCapability::RateEnforce, |_| {
            Ok(Box::new(RateEnforcer::new()))
        });
        registry.register(StageCapability::StillEncode, |config| {
            Ok(Box::new(StillEncoder::new(config.encoder.clone())))
        });
        registry.register(StageCapability::FileSink, |config| {
            Ok(Box::new(FileSink::new(
                config.output_dir.clone(),
                &config.naming_template,
                config.start_index,
            )?))
        });
        registry
    }

    /// Register (or replace) a factory for a capability.
    pub fn register<F>(&mut self, capability: StageCapability, factory: F)
    where
        F: Fn(&PipelineConfig) -> Result<Box<dyn Stage>> + Send + Sync + 'static,
    {
        self.factories.insert(capability, Box::new(factory));
    }

    /// Remove a capability, as a host without it would present itself.
    pub fn disable(&mut self, capability: StageCapability) {
        self.factories.remove(&capability);
    }

    /// Whether a capability is available.
    pub fn contains(&self, capability: StageCapability) -> bool {
        self.factories.contains_key(&capability)
    }

    /// Create a stage for a capability.
    pub fn create(
        &self,
        capability: StageCapability,
        config: &PipelineConfig,
    ) -> Result<Box<dyn Stage>> {
        let factory = self
            .factories
            .get(&capability)
            .ok_or(PipelineError::StageCreation { capability })?;
        factory(config)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_capabilities() {
        let registry = StageRegistry::with_defaults();
        for capability in StageCapability::ALL {
            assert!(registry.contains(capability), "{capability} missing");
        }
    }

    #[test]
    fn test_disabled_capability_fails_creation() {
        let mut registry = StageRegistry::with_defaults();
        registry.disable(StageCapability::StillEncode);

        let err = registry
            .create(StageCapability::StillEncode, &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StageCreation {
                capability: StageCapability::StillEncode
            }
        ));
    }

    #[test]
    fn test_created_stages_carry_element_names() {
        let registry = StageRegistry::with_defaults();
        let config = PipelineConfig::default();
        let names: Vec<String> = StageCapability::ALL
            .iter()
            .map(|c| registry.create(*c, &config).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            ["thumb_convert", "thumb_rate", "thumb_caps", "thumb_enc", "thumb_sink"]
        );
    }
}
