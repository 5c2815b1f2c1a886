//! Thumbnail pipeline for the thumbsink library.
//!
//! Builds the fixed five-stage element that turns an arbitrary raw video
//! stream into one JPEG still per second on disk:
//!
//! ```text
//! normalize -> rate-reduce -> rate-enforce -> still-encode -> file-sink
//! ```
//!
//! The pipeline exposes a single input port ([`ThumbnailPipeline::push_frame`])
//! and forwards control events ([`ThumbnailPipeline::send_event`]) through
//! unchanged. Output leaves as numbered files written by the sink stage, not
//! through a pipeline port.

mod caps;
mod config;
mod error;
mod event;
mod naming;
mod pipeline;
mod probe;
mod registry;
mod stage;
mod stages;

pub use caps::{Caps, FormatSet, MediaKind};
pub use config::{
    PipelineConfig, RateConfig, StillEncoderConfig, DEFAULT_MAX_RATE, DEFAULT_NAMING_TEMPLATE,
};
pub use error::{PipelineError, Result};
pub use event::Event;
pub use naming::NamingPolicy;
pub use pipeline::{PipelineState, ThumbnailPipeline};
pub use probe::FrameCountProbe;
pub use registry::{StageCapability, StageRegistry};
pub use stage::{EncodedStill, Stage, StagePayload};
pub use stages::{FileSink, FormatNormalizer, RateEnforcer, RateReducer, StillEncoder};
