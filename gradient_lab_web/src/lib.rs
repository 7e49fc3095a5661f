// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser host for the gradient lab.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` tick source
//! - [`WakeTimer`]: `setTimeout` wake-ups for capture deadlines, which keep
//!   firing while rAF is throttled in background tabs
//! - [`CanvasSource`]: reads a rendered canvas back as a
//!   [`PixelFrame`](gradient_lab_core::frame::PixelFrame)
//! - [`DownloadSink`]: delivers finished assets as browser downloads

#![no_std]

extern crate alloc;

mod canvas;
mod download;
mod raf;
mod wake;

pub use canvas::CanvasSource;
pub use download::DownloadSink;
pub use raf::RafLoop;
pub use wake::WakeTimer;

use gradient_lab_core::time::HostTime;
use web_sys::HtmlCanvasElement;

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microseconds.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}

/// Unix time in milliseconds at which [`now`] was zero.
///
/// Pass this as `PlaygroundConfig::origin_unix_ms` so asset filenames carry
/// wall-clock stamps.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Unix milliseconds are positive and fit in u64"
)]
pub fn time_origin_unix_ms() -> u64 {
    (js_sys::Date::now() - raf::performance_now()).max(0.0) as u64
}

/// Maps a pointer event's client coordinates to canvas pixels.
///
/// The canvas backing store may be larger than its CSS box (device pixel
/// ratio), and the playground normalizes against the backing size.
#[must_use]
pub fn pointer_in_canvas(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    scale_client_point(
        (client_x, client_y),
        (rect.left(), rect.top()),
        (rect.width(), rect.height()),
        (canvas.width(), canvas.height()),
    )
}

fn scale_client_point(
    client: (f64, f64),
    origin: (f64, f64),
    css_size: (f64, f64),
    backing: (u32, u32),
) -> (f64, f64) {
    let scale = |css: f64, px: u32| {
        if css > 0.0 {
            f64::from(px) / css
        } else {
            1.0
        }
    };
    (
        (client.0 - origin.0) * scale(css_size.0, backing.0),
        (client.1 - origin.1) * scale(css_size.1, backing.1),
    )
}
