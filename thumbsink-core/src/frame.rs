//! Raw video frame buffers.
//!
//! A [`VideoFrame`] is an uncompressed picture in one of the layouts the
//! pipeline accepts on its input port, together with its presentation
//! timestamp and flags.

use crate::timestamp::Timestamp;
use bitflags::bitflags;
use std::fmt;

/// Pixel layout of a raw video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, three planes.
    Yuv420p,
    /// Y plane followed by an interleaved UV plane.
    Nv12,
    /// Packed RGB, 3 bytes per pixel.
    Rgb24,
    /// Packed RGBA, 4 bytes per pixel.
    Rgba,
    /// Grayscale, 1 byte per pixel.
    Gray8,
}

impl PixelFormat {
    /// Number of planes in this layout.
    pub fn num_planes(&self) -> usize {
        match self {
            Self::Yuv420p => 3,
            Self::Nv12 => 2,
            Self::Rgb24 | Self::Rgba | Self::Gray8 => 1,
        }
    }

    /// Whether the layout stores components in separate planes.
    pub fn is_planar(&self) -> bool {
        matches!(self, Self::Yuv420p | Self::Nv12)
    }

    /// Dimensions of a plane in samples for a frame of `width` x `height`.
    pub fn plane_dimensions(&self, plane: usize, width: u32, height: u32) -> (usize, usize) {
        let (w, h) = (width as usize, height as usize);
        match self {
            Self::Yuv420p => {
                if plane == 0 {
                    (w, h)
                } else {
                    (w.div_ceil(2), h.div_ceil(2))
                }
            }
            Self::Nv12 => {
                if plane == 0 {
                    (w, h)
                } else {
                    // Interleaved UV: full width in bytes, half height.
                    (w, h.div_ceil(2))
                }
            }
            Self::Rgb24 | Self::Rgba | Self::Gray8 => (w, h),
        }
    }

    /// Bytes per sample unit within a row. For NV12 the plane width already
    /// counts the interleaved UV pair.
    fn bytes_per_unit(&self) -> usize {
        match self {
            Self::Rgb24 => 3,
            Self::Rgba => 4,
            Self::Yuv420p | Self::Nv12 | Self::Gray8 => 1,
        }
    }

    /// Size of one plane in bytes.
    pub fn plane_size(&self, plane: usize, width: u32, height: u32) -> usize {
        let (w, h) = self.plane_dimensions(plane, width, height);
        w * h * self.bytes_per_unit()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yuv420p => write!(f, "yuv420p"),
            Self::Nv12 => write!(f, "nv12"),
            Self::Rgb24 => write!(f, "rgb24"),
            Self::Rgba => write!(f, "rgba"),
            Self::Gray8 => write!(f, "gray8"),
        }
    }
}

bitflags! {
    /// Frame property flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameFlags: u32 {
        /// Keyframe.
        const KEYFRAME = 0x01;
        /// Frame data is known to be damaged.
        const CORRUPT = 0x02;
        /// Interlaced content.
        const INTERLACED = 0x04;
    }
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Pixel storage for one frame, tightly packed per plane.
#[derive(Clone)]
pub struct FrameBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
    planes: Vec<Vec<u8>>,
}

impl FrameBuffer {
    /// Allocate a zeroed buffer for the given geometry.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let planes = (0..format.num_planes())
            .map(|p| vec![0u8; format.plane_size(p, width, height)])
            .collect();
        Self {
            width,
            height,
            format,
            planes,
        }
    }

    /// Number of planes.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Plane data, if the index exists.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(|p| p.as_slice())
    }

    /// Mutable plane data, if the index exists.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.planes.get_mut(index).map(|p| p.as_mut_slice())
    }

    /// Bytes per row of a plane.
    pub fn stride(&self, plane: usize) -> usize {
        let (w, _) = self.format.plane_dimensions(plane, self.width, self.height);
        w * self.format.bytes_per_unit()
    }

    /// Fill every plane with a value.
    pub fn fill(&mut self, value: u8) {
        for plane in &mut self.planes {
            plane.fill(value);
        }
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("planes", &self.planes.len())
            .finish()
    }
}

/// An uncompressed video frame.
#[derive(Clone)]
pub struct VideoFrame {
    buffer: FrameBuffer,
    /// Presentation timestamp.
    pub pts: Timestamp,
    /// Frame flags.
    pub flags: FrameFlags,
}

impl VideoFrame {
    /// Create a zeroed frame with an undefined timestamp.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height, format),
            pts: Timestamp::none(),
            flags: FrameFlags::empty(),
        }
    }

    /// Create a frame from an existing buffer.
    pub fn from_buffer(buffer: FrameBuffer) -> Self {
        Self {
            buffer,
            pts: Timestamp::none(),
            flags: FrameFlags::empty(),
        }
    }

    /// Set the presentation timestamp, builder style.
    pub fn with_pts(mut self, pts: Timestamp) -> Self {
        self.pts = pts;
        self
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Pixel layout.
    pub fn format(&self) -> PixelFormat {
        self.buffer.format
    }

    /// Whether this is a keyframe.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(FrameFlags::KEYFRAME)
    }

    /// Underlying buffer.
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Mutable underlying buffer.
    pub fn buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    /// Plane data.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.buffer.plane(index)
    }

    /// Mutable plane data.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.buffer.plane_mut(index)
    }
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("pts", &self.pts)
            .field("flags", &self.flags)
            .finish()
    }
}
