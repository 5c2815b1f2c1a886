//! Rate enforcer stage.
//!
//! A contract checkpoint after the rate reducer: it only ever passes a
//! stream that is already at exactly one frame per second. It never drops
//! frames and never rate-limits; a violation is surfaced as
//! [`PipelineError::FormatNegotiation`] so a misconfigured reducer fails
//! loudly instead of silently passing mismatched data.

use crate::caps::Caps;
use crate::event::Event;
use crate::stage::{Stage, StagePayload};
use crate::{PipelineError, Result};
use thumbsink_core::{CoreError, Rational, Timestamp};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Spacing slack for timestamp rounding, one millisecond.
const TOLERANCE_NANOS: i64 = 1_000_000;

/// Rejects streams that do not already run at the required rate.
#[derive(Debug)]
pub struct RateEnforcer {
    required: Rational,
    period_nanos: i64,
    last_seen: Option<Timestamp>,
}

impl RateEnforcer {
    /// The rate this enforcer requires: one frame per second.
    pub const REQUIRED_RATE: Rational = Rational { num: 1, den: 1 };

    /// Create an enforcer.
    pub fn new() -> Self {
        Self {
            required: Self::REQUIRED_RATE,
            period_nanos: NANOS_PER_SEC,
            last_seen: None,
        }
    }

    /// The required rate.
    pub fn required_rate(&self) -> Rational {
        self.required
    }

    fn check_spacing(&self, pts: Timestamp) -> Result<()> {
        let Some(elapsed) = self.last_seen.and_then(|last| pts.elapsed_since(last)) else {
            return Ok(());
        };

        if elapsed + TOLERANCE_NANOS < self.period_nanos {
            let observed = if elapsed > 0 {
                Rational::new(NANOS_PER_SEC, elapsed).reduce()
            } else {
                Rational::from_int(i64::from(i32::MAX))
            };
            return Err(PipelineError::FormatNegotiation {
                required: self.required,
                observed,
            });
        }
        Ok(())
    }
}

impl Default for RateEnforcer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for RateEnforcer {
    fn name(&self) -> &str {
        "thumb_caps"
    }

    fn input_caps(&self) -> Caps {
        Caps::any_raw().with_rate(Self::REQUIRED_RATE)
    }

    fn output_caps(&self) -> Caps {
        Caps::any_raw().with_rate(Self::REQUIRED_RATE)
    }

    fn process(&mut self, payload: StagePayload) -> Result<Option<StagePayload>> {
        let StagePayload::Raw(frame) = payload else {
            return Err(PipelineError::Core(CoreError::invalid_param(
                "rate enforcer received a non-raw payload",
            )));
        };

        self.check_spacing(frame.pts)?;
        if frame.pts.is_valid() {
            self.last_seen = Some(frame.pts);
        }
        Ok(Some(StagePayload::Raw(frame)))
    }

    fn handle_event(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::StreamStart | Event::FlushStop | Event::Seek(_) => {
                self.last_seen = None;
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

    #[test]
    fn test_one_second_spacing_passes() {
        let mut stage = RateEnforcer::new();
        for s in 0..5 {
            assert!(stage.process(frame_at_ms(s * 1000)).unwrap().is_some());
        }
    }

    #[test]
    fn test_slower_than_required_passes() {
        // Sparse streams are fine; only a too-fast stream breaks the contract.
        let mut stage = RateEnforcer::new();
        assert!(stage.process(frame_at_ms(0)).unwrap().is_some());
        assert!(stage.process(frame_at_ms(3500)).unwrap().is_some());
    }

    #[test]
    fn test_too_fast_stream_is_rejected() {
        let mut stage = RateEnforcer::new();
        stage.process(frame_at_ms(0)).unwrap();
        let err = stage.process(frame_at_ms(500)).unwrap_err();
        match err {
            PipelineError::FormatNegotiation { required, observed } => {
                assert_eq!(required, Rational::new(1, 1));
                assert_eq!(observed, Rational::new(2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rounding_slack_accepted() {
        let mut stage = RateEnforcer::new();
        stage.process(frame_at_ms(0)).unwrap();
        // 999.5ms spacing is within the rounding tolerance.
        let frame = StagePayload::Raw(
            VideoFrame::new(4, 4, PixelFormat::Rgb24)
                .with_pts(Timestamp::new(999_500_000, TimeBase::NANOSECONDS)),
        );
        assert!(stage.process(frame).unwrap().is_some());
    }

    #[test]
    fn test_never_drops() {
        let mut stage = RateEnforcer::new();
        let out = stage.process(frame_at_ms(0)).unwrap();
        assert!(out.is_some());
    }

    #[test]
    fn test_reset_on_seek() {
        let mut stage = RateEnforcer::new();
        stage.process(frame_at_ms(5000)).unwrap();
        stage
            .handle_event(&Event::Seek(Timestamp::new(0, TimeBase::SECONDS)))
            .unwrap();
        // After the seek the earlier spacing marker is gone.
        assert!(stage.process(frame_at_ms(100)).unwrap().is_some());
    }
}
