// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated playground session without a browser.
//!
//! Drives a [`Playground`] at 60 Hz for a few seconds of virtual time, moves
//! a pointer in a circle, renders each frame with a small CPU stand-in for
//! the gradient shader, requests a snapshot and a recording, and writes the
//! results into an output directory (first argument, default
//! `capture-out`). Trace events go to stderr.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration as StdDuration;

use gradient_lab_codec::{DirectorySink, EncodeMode, GifAnimator, PngStillEncoder};
use gradient_lab_core::clock::FrameTick;
use gradient_lab_core::frame::PixelFrame;
use gradient_lab_core::pointer::SurfaceSize;
use gradient_lab_core::recording::RecordingOptions;
use gradient_lab_core::ripple::aggregate;
use gradient_lab_core::time::{Duration, HostTime};
use gradient_lab_core::trail::TrailSnapshot;
use gradient_lab_core::uniforms::{GradientParams, GradientUniforms};
use gradient_lab_core::{Playground, PlaygroundConfig};
use gradient_lab_debug::pretty::PrettyPrintSink;
use kurbo::Point;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 200;
/// 60 Hz refresh in microseconds.
const REFRESH_US: u64 = 16_667;
const RUN_FOR: HostTime = HostTime(3_000_000);
const SNAPSHOT_AT: HostTime = HostTime(400_000);
const RECORD_AT: HostTime = HostTime(500_000);

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "capture-out".to_owned());

    // -- playground --------------------------------------------------------
    let config = PlaygroundConfig {
        origin_unix_ms: unix_ms_now(),
        ..PlaygroundConfig::new()
    };
    let mut playground = Playground::new(
        config,
        Box::new(PngStillEncoder),
        Box::new(GifAnimator::new(EncodeMode::Threaded)),
        Box::new(DirectorySink::new(&out_dir)),
    )
    .with_trace_sink(Box::new(PrettyPrintSink::stderr()));
    playground.set_surface_size(SurfaceSize::new(WIDTH, HEIGHT));

    // -- surface -----------------------------------------------------------
    let surface = Rc::new(RefCell::new(PixelFrame::filled(WIDTH, HEIGHT, [0, 0, 0, 255])));
    let shared = Rc::clone(&surface);
    playground.attach_source(Box::new(move || Some(shared.borrow().clone())));

    // -- simulated loop ----------------------------------------------------
    let mut snapshot_requested = false;
    let mut recording_requested = false;
    let mut now = HostTime(0);
    let mut frame_index = 0;

    while now <= RUN_FOR {
        let angle = now.as_secs_f64() * 2.0;
        let x = f64::from(WIDTH) * (0.5 + 0.3 * angle.cos());
        let y = f64::from(HEIGHT) * (0.5 + 0.3 * angle.sin());
        playground.on_pointer_move(x, y);

        let uniforms = playground.on_frame(&FrameTick { now, frame_index });
        let trail = playground.trail().snapshot(playground.clock().now());
        render(
            &mut surface.borrow_mut(),
            &uniforms,
            &trail,
            playground.params(),
        );

        if !snapshot_requested && now >= SNAPSHOT_AT {
            snapshot_requested = true;
            if let Err(err) = playground.export_snapshot(now) {
                eprintln!("snapshot rejected: {err}");
            }
        }
        if !recording_requested && now >= RECORD_AT {
            recording_requested = true;
            let options = RecordingOptions {
                duration: 1.5,
                ..RecordingOptions::new()
            };
            if let Err(err) = playground.start_recording(options, now) {
                eprintln!("recording rejected: {err}");
            }
        }

        now = now + Duration(REFRESH_US);
        frame_index += 1;
    }

    // Let a background encode finish.
    while playground.status().is_recording {
        playground.advance(now);
        std::thread::sleep(StdDuration::from_millis(5));
    }

    if let Some(err) = playground.take_error() {
        eprintln!("capture failed: {err}");
        std::process::exit(1);
    }
    println!("assets written to {out_dir}");
}

fn unix_ms_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// CPU stand-in for the gradient shader: blends the three base colors over
/// a slowly moving field, warped and brightened by the ripple aggregate.
#[expect(
    clippy::cast_possible_truncation,
    reason = "channel values are clamped to [0, 255] before the cast"
)]
fn render(
    frame: &mut PixelFrame,
    uniforms: &GradientUniforms,
    trail: &TrailSnapshot,
    params: &GradientParams,
) {
    let time = f64::from(uniforms.time) * params.speed;
    let (w, h) = (frame.width(), frame.height());
    let colors = [uniforms.color_a, uniforms.color_b, uniforms.color_c];

    for py in 0..h {
        for px in 0..w {
            // uv has y up, matching normalized pointer coordinates.
            let uv = Point::new(
                (f64::from(px) + 0.5) / f64::from(w),
                1.0 - (f64::from(py) + 0.5) / f64::from(h),
            );
            let ripple = aggregate(uv, trail, &params.ripple, f64::from(uniforms.time));
            let p = uv + ripple.distortion;

            let s = params.scale;
            let w1 = 0.5 + 0.5 * (p.x * 3.0 * s + time * 0.6).sin();
            let w2 = 0.5 + 0.5 * (p.y * 4.0 * s - time * 0.4 + ripple.intensity).cos();

            let mut rgba = [0_u8, 0, 0, 255];
            for (c, out) in rgba.iter_mut().take(3).enumerate() {
                let ab = lerp(f64::from(colors[0][c]), f64::from(colors[1][c]), w1);
                let v = lerp(ab, f64::from(colors[2][c]), w2 * 0.6) + ripple.intensity * 0.5;
                *out = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            if let Some(dst) = frame.pixel_mut(px, py) {
                dst.copy_from_slice(&rgba);
            }
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
