//! Control-plane events.
//!
//! Events travel on the same ordered path as frames, so an event sent after
//! N frames is seen by each stage only after it has processed those N
//! frames.

use thumbsink_core::Timestamp;

/// An in-band control message, distinct from frame data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// A new stream is starting.
    StreamStart,
    /// No further frames will arrive.
    Eos,
    /// In-flight pacing state should be discarded; counters are untouched.
    FlushStop,
    /// The stream position jumped to the given timestamp.
    Seek(Timestamp),
}

impl Event {
    /// Stable name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Event::StreamStart => "stream-start",
            Event::Eos => "eos",
            Event::FlushStop => "flush-stop",
            Event::Seek(_) => "seek",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbsink_core::TimeBase;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::StreamStart.name(), "stream-start");
        assert_eq!(Event::Eos.name(), "eos");
        assert_eq!(Event::FlushStop.name(), "flush-stop");
        assert_eq!(
            Event::Seek(Timestamp::new(0, TimeBase::SECONDS)).name(),
            "seek"
        );
    }
}
