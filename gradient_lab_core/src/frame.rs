// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RGBA8 pixel grids captured from the rendering surface.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// An RGBA8 pixel grid, row-major, top row first.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for PixelFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl PixelFrame {
    /// Creates a frame filled with one color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = vec![0; pixels * 4];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wraps raw RGBA8 bytes. Returns `None` if either dimension is zero or
    /// `data` is not exactly `width × height × 4` bytes.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the frame, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Memory held by the pixel data.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Returns the pixel at `(x, y)`, or `None` out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Mutable access to one pixel, or `None` out of bounds.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some(&mut self.data[i..i + 4])
    }

    /// Dimensions after fitting the longest side into `max_dim`, preserving
    /// aspect ratio. Never upscales; each side is at least one pixel.
    #[must_use]
    pub fn fitted_size(&self, max_dim: u32) -> (u32, u32) {
        let longest = self.width.max(self.height);
        if max_dim == 0 || longest <= max_dim {
            return (self.width, self.height);
        }
        // floor(side × max_dim / longest), in integers.
        let fit = |side: u32| {
            let scaled = u64::from(side) * u64::from(max_dim) / u64::from(longest);
            u32::try_from(scaled).unwrap_or(max_dim).max(1)
        };
        (fit(self.width), fit(self.height))
    }

    /// Box-filters the frame so its longest side is at most `max_dim`.
    ///
    /// Returns a clone when the frame already fits.
    #[must_use]
    pub fn downscale_to_fit(&self, max_dim: u32) -> Self {
        let (w, h) = self.fitted_size(max_dim);
        if (w, h) == (self.width, self.height) {
            return self.clone();
        }

        let src_w = self.width as usize;
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for dy in 0..h as usize {
            let (y0, y1) = span(dy, h as usize, self.height as usize);
            for dx in 0..w as usize {
                let (x0, x1) = span(dx, w as usize, src_w);
                let mut sum = [0_u32; 4];
                for sy in y0..y1 {
                    let row = sy * src_w * 4;
                    for sx in x0..x1 {
                        let i = row + sx * 4;
                        for (acc, &byte) in sum.iter_mut().zip(&self.data[i..i + 4]) {
                            *acc += u32::from(byte);
                        }
                    }
                }
                let count = u32::try_from((y1 - y0) * (x1 - x0)).unwrap_or(u32::MAX);
                for acc in sum {
                    data.push(u8::try_from((acc + count / 2) / count).unwrap_or(u8::MAX));
                }
            }
        }
        Self {
            width: w,
            height: h,
            data,
        }
    }
}

/// Source range covered by destination index `d` when mapping `dst` cells
/// onto `src` cells. Always non-empty.
fn span(d: usize, dst: usize, src: usize) -> (usize, usize) {
    let start = d * src / dst;
    let end = ((d + 1) * src / dst).max(start + 1).min(src);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_validates_length() {
        assert!(PixelFrame::from_rgba(2, 2, vec![0; 16]).is_some(), "exact");
        assert!(PixelFrame::from_rgba(2, 2, vec![0; 15]).is_none(), "short");
        assert!(PixelFrame::from_rgba(0, 2, Vec::new()).is_none(), "empty");
    }

    #[test]
    fn fitted_size_preserves_aspect() {
        let frame = PixelFrame::filled(800, 1200, [0; 4]);
        assert_eq!(frame.fitted_size(600), (400, 600), "portrait");
        let wide = PixelFrame::filled(1920, 1080, [0; 4]);
        assert_eq!(wide.fitted_size(600), (600, 337), "floor of 337.5");
        let small = PixelFrame::filled(400, 300, [0; 4]);
        assert_eq!(small.fitted_size(600), (400, 300), "never upscales");
        let sliver = PixelFrame::filled(5000, 1, [0; 4]);
        assert_eq!(sliver.fitted_size(600), (600, 1), "at least one pixel");
    }

    #[test]
    fn downscale_averages_blocks() {
        // 4×2: left half black, right half white.
        let mut frame = PixelFrame::filled(4, 2, [0, 0, 0, 255]);
        for y in 0..2 {
            for x in 2..4 {
                frame
                    .pixel_mut(x, y)
                    .expect("in bounds")
                    .copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let half = frame.downscale_to_fit(2);
        assert_eq!((half.width(), half.height()), (2, 1), "halved");
        assert_eq!(half.pixel(0, 0), Some([0, 0, 0, 255]), "left block");
        assert_eq!(half.pixel(1, 0), Some([255, 255, 255, 255]), "right block");

        let one = frame.downscale_to_fit(1);
        assert_eq!((one.width(), one.height()), (1, 1), "single pixel");
        assert_eq!(one.pixel(0, 0), Some([128, 128, 128, 255]), "rounded mean");
    }

    #[test]
    fn downscale_within_bounds_is_identity() {
        let frame = PixelFrame::filled(10, 20, [1, 2, 3, 4]);
        assert_eq!(frame.downscale_to_fit(600), frame, "already fits");
        assert_eq!(frame.byte_len(), 10 * 20 * 4, "rgba8 bytes");
    }
}
