//! Stream capability descriptions used for stage-pair link negotiation.
//!
//! Each stage declares the capabilities of its input and output ports. At
//! link time the pipeline checks each adjacent pair; negotiation is local to
//! the pair, never global across the chain.

use thumbsink_core::{PixelFormat, Rational};

/// Kind of payload a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Uncompressed video frames.
    RawVideo,
    /// Encoded still-image payloads.
    StillImage,
}

/// Set of pixel formats a raw-video port supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSet {
    /// Any pixel format.
    Any,
    /// Only the listed pixel formats.
    Only(Vec<PixelFormat>),
}

impl FormatSet {
    fn intersects(&self, other: &FormatSet) -> bool {
        match (self, other) {
            (FormatSet::Any, _) | (_, FormatSet::Any) => true,
            (FormatSet::Only(a), FormatSet::Only(b)) => a.iter().any(|f| b.contains(f)),
        }
    }
}

/// Capabilities of a stage port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caps {
    /// Payload kind.
    pub kind: MediaKind,
    /// Accepted pixel formats (raw video only).
    pub formats: FormatSet,
    /// Required frame rate, if the port constrains one.
    pub rate: Option<Rational>,
}

impl Caps {
    /// Raw video in any layout at any rate.
    pub fn any_raw() -> Self {
        Self {
            kind: MediaKind::RawVideo,
            formats: FormatSet::Any,
            rate: None,
        }
    }

    /// Raw video restricted to the given layouts.
    pub fn raw_only(formats: Vec<PixelFormat>) -> Self {
        Self {
            kind: MediaKind::RawVideo,
            formats: FormatSet::Only(formats),
            rate: None,
        }
    }

    /// Encoded still images.
    pub fn still() -> Self {
        Self {
            kind: MediaKind::StillImage,
            formats: FormatSet::Any,
            rate: None,
        }
    }

    /// Constrain the port to an exact frame rate.
    pub fn with_rate(mut self, rate: Rational) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Whether this input port can accept what `upstream` produces.
    ///
    /// Rates only conflict when both ports pin one; an unconstrained side
    /// defers to the stream.
    pub fn accepts(&self, upstream: &Caps) -> bool {
        if self.kind != upstream.kind {
            return false;
        }
        if !self.formats.intersects(&upstream.formats) {
            return false;
        }
        match (self.rate, upstream.rate) {
            (Some(a), Some(b)) => a.reduce() == b.reduce(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_accepts_any() {
        assert!(Caps::any_raw().accepts(&Caps::any_raw()));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        assert!(!Caps::still().accepts(&Caps::any_raw()));
        assert!(!Caps::any_raw().accepts(&Caps::still()));
    }

    #[test]
    fn test_format_intersection() {
        let rgb = Caps::raw_only(vec![PixelFormat::Rgb24]);
        let rgb_or_gray = Caps::raw_only(vec![PixelFormat::Rgb24, PixelFormat::Gray8]);
        let yuv = Caps::raw_only(vec![PixelFormat::Yuv420p]);

        assert!(rgb_or_gray.accepts(&rgb));
        assert!(rgb.accepts(&rgb_or_gray));
        assert!(!yuv.accepts(&rgb));
        assert!(Caps::any_raw().accepts(&rgb));
    }

    #[test]
    fn test_rate_negotiation() {
        let one_fps = Caps::any_raw().with_rate(Rational::new(1, 1));
        let also_one = Caps::any_raw().with_rate(Rational::new(2, 2));
        let two_fps = Caps::any_raw().with_rate(Rational::new(2, 1));
        let unconstrained = Caps::any_raw();

        assert!(one_fps.accepts(&also_one));
        assert!(!one_fps.accepts(&two_fps));
        assert!(one_fps.accepts(&unconstrained));
        assert!(unconstrained.accepts(&two_fps));
    }
}
