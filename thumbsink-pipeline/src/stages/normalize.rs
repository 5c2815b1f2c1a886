//! Format normalizer stage.
//!
//! Accepts any supported raw layout and outputs packed RGB, the canonical
//! layout the still encoder decodes. Timestamps and flags pass through
//! untouched.

use crate::caps::Caps;
use crate::stage::{Stage, StagePayload};
use crate::{PipelineError, Result};
use thumbsink_core::{CoreError, PixelFormat, VideoFrame};

/// Converts arbitrary raw video layouts to [`PixelFormat::Rgb24`].
#[derive(Debug, Default)]
pub struct FormatNormalizer {
    frames_converted: u64,
}

impl FormatNormalizer {
    /// Create a normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames that have passed through so far.
    pub fn frames_converted(&self) -> u64 {
        self.frames_converted
    }

    fn normalize(&self, frame: VideoFrame) -> Result<VideoFrame> {
        match frame.format() {
            PixelFormat::Rgb24 => Ok(frame),
            PixelFormat::Rgba => Ok(rgba_to_rgb(&frame)),
            PixelFormat::Gray8 => Ok(gray_to_rgb(&frame)),
            PixelFormat::Yuv420p => Ok(yuv420p_to_rgb(&frame)),
            PixelFormat::Nv12 => Ok(nv12_to_rgb(&frame)),
            other => Err(PipelineError::Core(CoreError::unsupported_format(
                other.to_string(),
            ))),
        }
    }
}

impl Stage for FormatNormalizer {
    fn name(&self) -> &str {
        "thumb_convert"
    }

    fn input_caps(&self) -> Caps {
        Caps::any_raw()
    }

    fn output_caps(&self) -> Caps {
        Caps::raw_only(vec![PixelFormat::Rgb24])
    }

    fn process(&mut self, payload: StagePayload) -> Result<Option<StagePayload>> {
        let StagePayload::Raw(frame) = payload else {
            return Err(PipelineError::Core(CoreError::invalid_param(
                "normalizer received a non-raw payload",
            )));
        };
        let out = self.normalize(frame)?;
        self.frames_converted += 1;
        Ok(Some(StagePayload::Raw(out)))
    }
}

/// Carry geometry, pts and flags into a fresh RGB frame.
fn rgb_shell(src: &VideoFrame) -> VideoFrame {
    let mut out = VideoFrame::new(src.width(), src.height(), PixelFormat::Rgb24);
    out.pts = src.pts;
    out.flags = src.flags;
    out
}

fn rgba_to_rgb(src: &VideoFrame) -> VideoFrame {
    let mut out = rgb_shell(src);
    if let (Some(rgba), Some(rgb)) = (src.plane(0), out.plane_mut(0)) {
        for (dst, px) in rgb.chunks_exact_mut(3).zip(rgba.chunks_exact(4)) {
            dst.copy_from_slice(&px[..3]);
        }
    }
    out
}

fn gray_to_rgb(src: &VideoFrame) -> VideoFrame {
    let mut out = rgb_shell(src);
    if let (Some(gray), Some(rgb)) = (src.plane(0), out.plane_mut(0)) {
        for (dst, &y) in rgb.chunks_exact_mut(3).zip(gray.iter()) {
            dst.fill(y);
        }
    }
    out
}

/// Full-range BT.601 YCbCr to RGB for one pixel.
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344136 * cb - 0.714136 * cr;
    let b = y + 1.772 * cb;
    [
        r.clamp(0.0, 255.0) as u8,
        g.clamp(0.0, 255.0) as u8,
        b.clamp(0.0, 255.0) as u8,
    ]
}

fn yuv420p_to_rgb(src: &VideoFrame) -> VideoFrame {
    let width = src.width() as usize;
    let height = src.height() as usize;
    let chroma_width = width.div_ceil(2);

    let mut out = rgb_shell(src);
    if let (Some(y_plane), Some(u_plane), Some(v_plane)) =
        (src.plane(0), src.plane(1), src.plane(2))
    {
        if let Some(rgb) = out.plane_mut(0) {
            for row in 0..height {
                for col in 0..width {
                    let y = y_plane[row * width + col];
                    let ci = (row / 2) * chroma_width + col / 2;
                    let px = ycbcr_to_rgb(y, u_plane[ci], v_plane[ci]);
                    rgb[(row * width + col) * 3..][..3].copy_from_slice(&px);
                }
            }
        }
    }
    out
}

fn nv12_to_rgb(src: &VideoFrame) -> VideoFrame {
    let width = src.width() as usize;
    let height = src.height() as usize;

    let mut out = rgb_shell(src);
    if let (Some(y_plane), Some(uv_plane)) = (src.plane(0), src.plane(1)) {
        if let Some(rgb) = out.plane_mut(0) {
            for row in 0..height {
                for col in 0..width {
                    let y = y_plane[row * width + col];
                    let uv = (row / 2) * width + (col / 2) * 2;
                    let px = ycbcr_to_rgb(y, uv_plane[uv], uv_plane[uv + 1]);
                    rgb[(row * width + col) * 3..][..3].copy_from_slice(&px);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbsink_core::{FrameFlags, TimeBase, Timestamp};

    fn raw(frame: VideoFrame) -> StagePayload {
        StagePayload::Raw(frame)
    }

    fn unwrap_raw(payload: Option<StagePayload>) -> VideoFrame {
        match payload {
            Some(StagePayload::Raw(frame)) => frame,
            other => panic!("expected raw output, got {other:?}"),
        }
    }

    #[test]
    fn test_rgb_passes_through() {
        let mut stage = FormatNormalizer::new();
        let out = unwrap_raw(
            stage
                .process(raw(VideoFrame::new(8, 8, PixelFormat::Rgb24)))
                .unwrap(),
        );
        assert_eq!(out.format(), PixelFormat::Rgb24);
        assert_eq!(stage.frames_converted(), 1);
    }

    #[test]
    fn test_gray_replicates_channels() {
        let mut stage = FormatNormalizer::new();
        let mut frame = VideoFrame::new(4, 4, PixelFormat::Gray8);
        frame.buffer_mut().fill(0x40);
        let out = unwrap_raw(stage.process(raw(frame)).unwrap());
        assert!(out
            .plane(0)
            .unwrap()
            .chunks_exact(3)
            .all(|px| px == [0x40, 0x40, 0x40]));
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let mut stage = FormatNormalizer::new();
        let mut frame = VideoFrame::new(2, 2, PixelFormat::Rgba);
        for px in frame.plane_mut(0).unwrap().chunks_exact_mut(4) {
            px.copy_from_slice(&[10, 20, 30, 255]);
        }
        let out = unwrap_raw(stage.process(raw(frame)).unwrap());
        assert!(out
            .plane(0)
            .unwrap()
            .chunks_exact(3)
            .all(|px| px == [10, 20, 30]));
    }

    #[test]
    fn test_yuv_gray_midpoint_maps_to_gray() {
        // Y=128 with neutral chroma is mid gray in full-range BT.601.
        let mut stage = FormatNormalizer::new();
        let mut frame = VideoFrame::new(4, 4, PixelFormat::Yuv420p);
        frame.buffer_mut().fill(128);
        let out = unwrap_raw(stage.process(raw(frame)).unwrap());
        assert!(out.plane(0).unwrap().iter().all(|&b| b == 128));
    }

    #[test]
    fn test_timestamp_and_flags_preserved() {
        let mut stage = FormatNormalizer::new();
        let pts = Timestamp::new(750, TimeBase::MILLISECONDS);
        let mut frame = VideoFrame::new(4, 4, PixelFormat::Nv12).with_pts(pts);
        frame.flags |= FrameFlags::KEYFRAME;
        let out = unwrap_raw(stage.process(raw(frame)).unwrap());
        assert_eq!(out.pts, pts);
        assert!(out.is_keyframe());
    }
}
