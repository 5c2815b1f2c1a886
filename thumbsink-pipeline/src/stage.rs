//! Stage abstraction.
//!
//! A stage is one processing unit in the fixed chain, with one input and one
//! output. Stages process payloads strictly in arrival order and never
//! reorder.

use crate::caps::{Caps, MediaKind};
use crate::event::Event;
use crate::Result;
use thumbsink_core::{Timestamp, VideoFrame};

/// A compressed still-image payload produced by the encoder stage.
#[derive(Debug, Clone)]
pub struct EncodedStill {
    /// Encoded image bytes, one standalone image.
    pub data: Vec<u8>,
    /// Presentation timestamp carried over from the source frame.
    pub pts: Timestamp,
}

/// Data travelling between stages.
#[derive(Debug)]
pub enum StagePayload {
    /// An uncompressed video frame.
    Raw(VideoFrame),
    /// An encoded still image.
    Still(EncodedStill),
}

impl StagePayload {
    /// Presentation timestamp of the payload.
    pub fn pts(&self) -> Timestamp {
        match self {
            StagePayload::Raw(frame) => frame.pts,
            StagePayload::Still(still) => still.pts,
        }
    }

    /// Payload kind.
    pub fn kind(&self) -> MediaKind {
        match self {
            StagePayload::Raw(_) => MediaKind::RawVideo,
            StagePayload::Still(_) => MediaKind::StillImage,
        }
    }
}

/// One processing unit in the pipeline.
pub trait Stage: Send + std::fmt::Debug {
    /// Stage name, stable for the pipeline's lifetime.
    fn name(&self) -> &str;

    /// Capabilities of the input port.
    fn input_caps(&self) -> Caps;

    /// Capabilities of the output port.
    fn output_caps(&self) -> Caps;

    /// Process one payload.
    ///
    /// `Ok(Some(_))` forwards a payload downstream, `Ok(None)` means the
    /// payload was dropped or consumed here.
    fn process(&mut self, payload: StagePayload) -> Result<Option<StagePayload>>;

    /// Handle a control event. The default accepts every event unchanged.
    fn handle_event(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }

    /// Finish the stream; called once at end-of-stream.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbsink_core::{PixelFormat, TimeBase};

    #[test]
    fn test_payload_pts_and_kind() {
        let pts = Timestamp::new(1, TimeBase::SECONDS);
        let raw = StagePayload::Raw(VideoFrame::new(8, 8, PixelFormat::Rgb24).with_pts(pts));
        assert_eq!(raw.kind(), MediaKind::RawVideo);
        assert_eq!(raw.pts(), pts);

        let still = StagePayload::Still(EncodedStill {
            data: vec![0xFF, 0xD8],
            pts,
        });
        assert_eq!(still.kind(), MediaKind::StillImage);
        assert_eq!(still.pts(), pts);
    }
}
