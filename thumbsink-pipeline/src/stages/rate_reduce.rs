//! Rate reducer stage.
//!
//! Drops frames so that at most one frame per configured period survives.
//! Drop-only: frames are never duplicated or interpolated to fill gaps, and
//! timestamps are never rewritten.

use crate::caps::Caps;
use crate::config::RateConfig;
use crate::event::Event;
use crate::stage::{Stage, StagePayload};
use crate::{PipelineError, Result};
use thumbsink_core::{CoreError, Timestamp};
use tracing::trace;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Thins an arbitrary-rate stream down to the configured maximum rate.
#[derive(Debug)]
pub struct RateReducer {
    config: RateConfig,
    period_nanos: i64,
    last_passed: Option<Timestamp>,
    frames_in: u64,
    frames_out: u64,
}

impl RateReducer {
    /// Create a reducer from rate parameters.
    pub fn new(config: RateConfig) -> Result<Self> {
        if !config.drop_only {
            return Err(PipelineError::InvalidConfig(
                "rate reducer only supports drop-only mode".to_string(),
            ));
        }
        if config.max_rate == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_rate must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            period_nanos: NANOS_PER_SEC / config.max_rate as i64,
            config,
            last_passed: None,
            frames_in: 0,
            frames_out: 0,
        })
    }

    /// Rate parameters this reducer was built with.
    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    /// Frames received on the input.
    pub fn frames_in(&self) -> u64 {
        self.frames_in
    }

    /// Frames passed downstream.
    pub fn frames_out(&self) -> u64 {
        self.frames_out
    }

    /// A frame passes unless less than one period has elapsed since the
    /// last passed frame. Frames with undefined timestamps cannot be paced
    /// and always pass.
    fn should_pass(&self, pts: Timestamp) -> bool {
        match self.last_passed {
            Some(last) => match pts.elapsed_since(last) {
                Some(elapsed) => elapsed >= self.period_nanos,
                None => true,
            },
            None => true,
        }
    }
}

impl Stage for RateReducer {
    fn name(&self) -> &str {
        "thumb_rate"
    }

    fn input_caps(&self) -> Caps {
        Caps::any_raw()
    }

    fn output_caps(&self) -> Caps {
        // Drop-only reduction approximates the target rate; it guarantees a
        // ceiling, not an exact rate, so the output stays unconstrained.
        Caps::any_raw()
    }

    fn process(&mut self, payload: StagePayload) -> Result<Option<StagePayload>> {
        let StagePayload::Raw(frame) = payload else {
            return Err(PipelineError::Core(CoreError::invalid_param(
                "rate reducer received a non-raw payload",
            )));
        };
        self.frames_in += 1;

        if !self.should_pass(frame.pts) {
            trace!(pts = %frame.pts, "frame dropped");
            return Ok(None);
        }

        if frame.pts.is_valid() {
            self.last_passed = Some(frame.pts);
        }
        self.frames_out += 1;
        Ok(Some(StagePayload::Raw(frame)))
    }

    fn handle_event(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::StreamStart | Event::FlushStop | Event::Seek(_) => {
                self.last_passed = None;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbsink_core::{PixelFormat, TimeBase, VideoFrame};

    fn frame_at_ms(ms: i64) -> StagePayload {
        StagePayload::Raw(
            VideoFrame::new(4, 4, PixelFormat::Rgb24)
                .with_pts(Timestamp::new(ms, TimeBase::MILLISECONDS)),
        )
    }

    fn reducer() -> RateReducer {
        RateReducer::new(RateConfig::default()).unwrap()
    }

    #[test]
    fn test_first_frame_passes() {
        let mut stage = reducer();
        assert!(stage.process(frame_at_ms(0)).unwrap().is_some());
    }

    #[test]
    fn test_thirty_fps_reduces_to_one_per_second() {
        let mut stage = reducer();
        let mut passed = 0;
        for i in 0..90 {
            if stage.process(frame_at_ms(i * 33)).unwrap().is_some() {
                passed += 1;
            }
        }
        // 90 frames spanning ~3 seconds
        assert_eq!(passed, 3);
        assert_eq!(stage.frames_in(), 90);
        assert_eq!(stage.frames_out(), 3);
    }

    #[test]
    fn test_exact_period_boundary_passes() {
        let mut stage = reducer();
        assert!(stage.process(frame_at_ms(0)).unwrap().is_some());
        assert!(stage.process(frame_at_ms(999)).unwrap().is_none());
        assert!(stage.process(frame_at_ms(1000)).unwrap().is_some());
    }

    #[test]
    fn test_timestamps_never_rewritten() {
        let mut stage = reducer();
        stage.process(frame_at_ms(0)).unwrap();
        let out = stage.process(frame_at_ms(1700)).unwrap().unwrap();
        assert_eq!(out.pts(), Timestamp::new(1700, TimeBase::MILLISECONDS));
    }

    #[test]
    fn test_undefined_pts_always_passes() {
        let mut stage = reducer();
        for _ in 0..3 {
            let frame = StagePayload::Raw(VideoFrame::new(4, 4, PixelFormat::Rgb24));
            assert!(stage.process(frame).unwrap().is_some());
        }
    }

    #[test]
    fn test_flush_resets_pacing() {
        let mut stage = reducer();
        assert!(stage.process(frame_at_ms(0)).unwrap().is_some());
        assert!(stage.process(frame_at_ms(100)).unwrap().is_none());
        stage.handle_event(&Event::FlushStop).unwrap();
        assert!(stage.process(frame_at_ms(200)).unwrap().is_some());
    }

    #[test]
    fn test_duplication_mode_rejected() {
        let err = RateReducer::new(RateConfig {
            drop_only: false,
            max_rate: 1,
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_rate_rejected() {
        let err = RateReducer::new(RateConfig {
            drop_only: true,
            max_rate: 0,
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }
}
