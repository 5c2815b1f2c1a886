//! Still encoder stage.
//!
//! Compresses each surviving RGB frame into one standalone JPEG payload.
//! Encoding is deterministic: identical input frames and configuration
//! yield identical bytes.

use crate::caps::Caps;
use crate::config::StillEncoderConfig;
use crate::stage::{EncodedStill, Stage, StagePayload};
use crate::{PipelineError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thumbsink_core::{CoreError, PixelFormat, VideoFrame};
use tracing::trace;

/// Encodes raw RGB frames as JPEG stills.
#[derive(Debug)]
pub struct StillEncoder {
    config: StillEncoderConfig,
}

impl StillEncoder {
    /// Create an encoder.
    pub fn new(config: StillEncoderConfig) -> Self {
        Self { config }
    }

    /// Encoder parameters.
    pub fn config(&self) -> &StillEncoderConfig {
        &self.config
    }

    fn encode(&self, frame: &VideoFrame) -> Result<Vec<u8>> {
        if frame.format() != PixelFormat::Rgb24 {
            return Err(PipelineError::Core(CoreError::unsupported_format(format!(
                "still encoder expects rgb24, got {}",
                frame.format()
            ))));
        }
        let Some(rgb) = frame.plane(0) else {
            return Err(PipelineError::Core(CoreError::invalid_param(
                "rgb frame has no pixel data",
            )));
        };

        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, self.config.quality).write_image(
            rgb,
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(data)
    }
}

impl Stage for StillEncoder {
    fn name(&self) -> &str {
        "thumb_enc"
    }

    fn input_caps(&self) -> Caps {
        Caps::raw_only(vec![PixelFormat::Rgb24])
    }

    fn output_caps(&self) -> Caps {
        Caps::still()
    }

    fn process(&mut self, payload: StagePayload) -> Result<Option<StagePayload>> {
        let StagePayload::Raw(frame) = payload else {
            return Err(PipelineError::Core(CoreError::invalid_param(
                "still encoder received a non-raw payload",
            )));
        };

        let data = self.encode(&frame)?;
        trace!(pts = %frame.pts, bytes = data.len(), "frame encoded");
        Ok(Some(StagePayload::Still(EncodedStill {
            data,
            pts: frame.pts,
        })))
    }
}
