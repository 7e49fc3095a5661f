// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer coordinate normalization.
//!
//! Pointer events arrive in surface pixel coordinates with the origin at the
//! top-left. The rendering surface works in `[0, 1]²` with the origin at the
//! bottom-left, so the vertical axis is flipped and both axes are clamped;
//! dragging off the surface pins the pointer to the nearest edge.

use kurbo::Point;

/// Pixel dimensions of the rendering surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Creates a surface size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Maps a pointer position in surface pixels to normalized surface
/// coordinates.
///
/// A degenerate surface maps everything to the centre.
#[must_use]
pub fn normalize_pointer(x: f64, y: f64, size: SurfaceSize) -> Point {
    if size.is_empty() {
        return Point::new(0.5, 0.5);
    }
    let u = unit(x / f64::from(size.width));
    let v = unit(1.0 - y / f64::from(size.height));
    Point::new(u, v)
}

fn unit(v: f64) -> f64 {
    if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0) }
}
