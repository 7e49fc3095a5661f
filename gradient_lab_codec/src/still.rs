// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use gradient_lab_core::encode::StillEncoder;
use gradient_lab_core::error::EncodeError;
use gradient_lab_core::frame::PixelFrame;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// Encodes snapshots as RGBA8 PNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngStillEncoder;

impl StillEncoder for PngStillEncoder {
    fn encode_png(&self, frame: &PixelFrame) -> Result<Vec<u8>, EncodeError> {
        let mut png_bytes = Vec::new();
        PngEncoder::new(&mut png_bytes)
            .write_image(
                frame.as_bytes(),
                frame.width(),
                frame.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| EncodeError::Codec(e.to_string()))?;
        Ok(png_bytes)
    }
}
