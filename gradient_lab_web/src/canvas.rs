// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas read-back.

use gradient_lab_core::frame::PixelFrame;
use gradient_lab_core::source::FrameSource;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Reads a rendered canvas (WebGL or 2D) back as RGBA8.
///
/// The canvas is drawn into a private 2D scratch canvas and read with
/// `getImageData`, which works for any context type. A WebGL canvas must be
/// created with `preserveDrawingBuffer: true`, or captured in the same task
/// that rendered it; otherwise the read-back is blank.
pub struct CanvasSource {
    canvas: HtmlCanvasElement,
    scratch: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl core::fmt::Debug for CanvasSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasSource")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .finish_non_exhaustive()
    }
}

impl CanvasSource {
    /// Wraps `canvas`. Returns `None` if no document or 2D context is
    /// available for the scratch canvas.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let scratch = document
            .create_element("canvas")
            .ok()?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        let ctx = scratch
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            scratch,
            ctx,
        })
    }

    /// The wrapped canvas.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl FrameSource for CanvasSource {
    fn capture(&self) -> Option<PixelFrame> {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        if width == 0 || height == 0 {
            return None;
        }
        if self.scratch.width() != width || self.scratch.height() != height {
            self.scratch.set_width(width);
            self.scratch.set_height(height);
        }
        let (w, h) = (f64::from(width), f64::from(height));
        self.ctx.clear_rect(0.0, 0.0, w, h);
        self.ctx
            .draw_image_with_html_canvas_element(&self.canvas, 0.0, 0.0)
            .ok()?;
        let data = self.ctx.get_image_data(0.0, 0.0, w, h).ok()?.data();
        PixelFrame::from_rgba(width, height, data.0)
    }
}
