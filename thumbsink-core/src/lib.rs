//! # Thumbsink Core
//!
//! Core types for the thumbsink pipeline.
//!
//! This crate provides the building blocks shared by every part of the
//! pipeline:
//! - Error handling types
//! - Rational numbers for frame rates and time bases
//! - Timestamps with explicit time bases
//! - Raw video frame buffers

pub mod error;
pub mod frame;
pub mod rational;
pub mod timestamp;

pub use error::{CoreError, Result};
pub use frame::{FrameBuffer, FrameFlags, PixelFormat, VideoFrame};
pub use rational::Rational;
pub use timestamp::{TimeBase, Timestamp};
