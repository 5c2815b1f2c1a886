//! Pipeline error types.

use crate::registry::StageCapability;
use std::path::PathBuf;
use thiserror::Error;
use thumbsink_core::{CoreError, Rational};

/// Pipeline error type.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required stage capability is unavailable in the hosting
    /// environment. Fatal, the pipeline cannot be constructed.
    #[error("Stage capability unavailable: {capability}")]
    StageCreation {
        /// The missing capability.
        capability: StageCapability,
    },

    /// Two adjacent stages cannot agree on a data format. Fatal at
    /// construction time.
    #[error("Cannot link {upstream} to {downstream}: incompatible capabilities")]
    Linkage {
        /// Producing stage name.
        upstream: String,
        /// Consuming stage name.
        downstream: String,
    },

    /// The rate contract was violated at runtime by an unexpected upstream
    /// rate. Normally indicates a misconfigured rate reducer.
    #[error("Stream rate {observed} fps does not satisfy required rate {required} fps")]
    FormatNegotiation {
        /// The rate the enforcer requires.
        required: Rational,
        /// The rate observed on the stream.
        observed: Rational,
    },

    /// A numbered output file could not be created or written. Propagated
    /// without retry; the pipeline halts.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Still image encoding failed.
    #[error("Still encode failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pipeline reached a terminal state and no longer accepts data or
    /// events.
    #[error("Pipeline halted")]
    Halted,

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

/// Pipeline result type.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_creation_display() {
        let err = PipelineError::StageCreation {
            capability: StageCapability::StillEncode,
        };
        assert_eq!(
            err.to_string(),
            "Stage capability unavailable: still-encode"
        );
    }

    #[test]
    fn test_format_negotiation_display() {
        let err = PipelineError::FormatNegotiation {
            required: Rational::new(1, 1),
            observed: Rational::new(2, 1),
        };
        assert!(err.to_string().contains("2 fps"));
        assert!(err.to_string().contains("required rate 1 fps"));
    }
}
