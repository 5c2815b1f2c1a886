//! Observation probe attached between the rate enforcer and the encoder.

use crate::stage::StagePayload;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Counts frames passing the observation point and emits one diagnostic
/// line per frame.
///
/// The probe never drops, delays, or mutates payloads; removing it does not
/// change pipeline output. The counter is owned by the pipeline instance,
/// never shared across instances, and is atomic so a host that parallelizes
/// stage execution still counts correctly.
#[derive(Debug, Default)]
pub struct FrameCountProbe {
    count: AtomicU64,
}

impl FrameCountProbe {
    /// Create a probe with the counter at zero.
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    /// Observe one payload: increment the counter and, unless `silent`,
    /// emit the running ordinal (starting at 0) on the diagnostic stream.
    pub fn observe(&self, payload: &StagePayload, silent: bool) {
        let ordinal = self.count.fetch_add(1, Ordering::SeqCst);
        if !silent {
            info!(frame = ordinal, pts = %payload.pts(), "thumbnail frame");
        }
    }

    /// Total frames observed so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
