// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoder seams.
//!
//! Still images are encoded in one call. Animated images are encoded by a
//! job the controller polls from its event loop, so progress and the
//! terminal result arrive on the same thread that owns the session even
//! when the work itself runs elsewhere.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::EncodeError;
use crate::frame::PixelFrame;
use crate::time::Duration;

/// Lossless single-frame encoder.
pub trait StillEncoder {
    /// Encodes `frame` as PNG at full fidelity.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Codec`] if the codec rejects the frame.
    fn encode_png(&self, frame: &PixelFrame) -> Result<Vec<u8>, EncodeError>;
}

/// Timing and quality parameters for an animated encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationOptions {
    /// Display time of each frame.
    pub frame_delay: Duration,
    /// Color sampling interval, 1 (best) to 30 (fastest).
    pub sample_interval: u8,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(100),
            sample_interval: 10,
        }
    }
}

/// Result of polling an [`EncodeJob`].
#[derive(Clone, Debug, PartialEq)]
pub enum EncodePoll {
    /// Still running; fraction of work done in `[0, 1]`.
    Progress(f32),
    /// Terminal result. Polling again after this is unspecified.
    Finished(Result<Vec<u8>, EncodeError>),
}

/// An animated encode in flight.
pub trait EncodeJob {
    /// Advances the job (or collects news from a worker) without blocking
    /// for the whole encode.
    fn poll(&mut self) -> EncodePoll;

    /// Requests that the job stop as soon as it can. No result is expected
    /// afterwards.
    fn cancel(&mut self);
}

/// Starts animated encodes.
pub trait AnimatedEncoder {
    /// Takes ownership of `frames` and starts encoding them in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the frames cannot be encoded at all, for example
    /// [`EncodeError::EmptyInput`] or [`EncodeError::MismatchedFrame`].
    fn begin(
        &self,
        frames: Vec<PixelFrame>,
        options: &AnimationOptions,
    ) -> Result<Box<dyn EncodeJob>, EncodeError>;
}

/// Checks that `frames` is non-empty and that every frame shares the first
/// frame's dimensions. Returns those dimensions.
///
/// # Errors
///
/// [`EncodeError::EmptyInput`] or [`EncodeError::MismatchedFrame`].
pub fn validate_frames(frames: &[PixelFrame]) -> Result<(u32, u32), EncodeError> {
    let first = frames.first().ok_or(EncodeError::EmptyInput)?;
    let size = (first.width(), first.height());
    for (index, frame) in frames.iter().enumerate().skip(1) {
        if (frame.width(), frame.height()) != size {
            return Err(EncodeError::MismatchedFrame { index });
        }
    }
    Ok(size)
}
