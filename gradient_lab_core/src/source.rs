// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capturable rendering surfaces.
//!
//! The rendering surface is owned by the host. Capture code only ever
//! borrows it through [`CaptureSources`], which tracks which surfaces are
//! currently attached and resolves the most recently attached one.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::error::CaptureError;
use crate::frame::PixelFrame;

/// Something that can produce the current pixels of a rendered frame.
pub trait FrameSource {
    /// Reads back the current frame, or `None` if the surface cannot be
    /// read right now (lost context, zero size, torn down).
    fn capture(&self) -> Option<PixelFrame>;
}

impl<F: Fn() -> Option<PixelFrame>> FrameSource for F {
    fn capture(&self) -> Option<PixelFrame> {
        self()
    }
}

/// Handle returned by [`CaptureSources::attach`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(u32);

/// Registry of attached surfaces.
///
/// Capture resolves to the most recently attached surface that is still
/// attached. Detaching it falls back to the previous one.
#[derive(Default)]
pub struct CaptureSources {
    entries: Vec<(SourceId, Box<dyn FrameSource>)>,
    next_id: u32,
}

impl fmt::Debug for CaptureSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<SourceId> = self.entries.iter().map(|(id, _)| *id).collect();
        f.debug_struct("CaptureSources")
            .field("attached", &ids)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl CaptureSources {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers a surface and makes it the active capture target.
    pub fn attach(&mut self, source: Box<dyn FrameSource>) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, source));
        id
    }

    /// Removes a surface. Returns `false` if it was not attached.
    pub fn detach(&mut self, id: SourceId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// The surface capture would read from, if any.
    #[must_use]
    pub fn resolve(&self) -> Option<SourceId> {
        self.entries.last().map(|(id, _)| *id)
    }

    /// Whether any surface is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads the active surface.
    ///
    /// # Errors
    ///
    /// [`CaptureError::SourceUnavailable`] when nothing is attached or the
    /// surface could not be read.
    pub fn capture(&self) -> Result<PixelFrame, CaptureError> {
        let (_, source) = self.entries.last().ok_or(CaptureError::SourceUnavailable)?;
        source.capture().ok_or(CaptureError::SourceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(shade: u8) -> Box<dyn FrameSource> {
        Box::new(move || Some(PixelFrame::filled(2, 2, [shade, shade, shade, 255])))
    }

    #[test]
    fn empty_registry_is_unavailable() {
        let sources = CaptureSources::new();
        assert_eq!(sources.capture(), Err(CaptureError::SourceUnavailable));
    }

    #[test]
    fn most_recent_attachment_wins() {
        let mut sources = CaptureSources::new();
        let first = sources.attach(solid(10));
        let second = sources.attach(solid(20));
        assert_eq!(sources.resolve(), Some(second));
        let frame = sources.capture().expect("attached");
        assert_eq!(frame.pixel(0, 0), Some([20, 20, 20, 255]));

        assert!(sources.detach(second), "was attached");
        assert!(!sources.detach(second), "already detached");
        assert_eq!(sources.resolve(), Some(first));
        let frame = sources.capture().expect("fallback");
        assert_eq!(frame.pixel(0, 0), Some([10, 10, 10, 255]));
    }

    #[test]
    fn failing_surface_is_unavailable() {
        let mut sources = CaptureSources::new();
        sources.attach(Box::new(|| -> Option<PixelFrame> { None }));
        assert_eq!(sources.capture(), Err(CaptureError::SourceUnavailable));
    }
}
