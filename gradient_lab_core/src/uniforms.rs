// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame parameter set consumed by the rendering surface.
//!
//! [`GradientParams`] is what the control panel edits. Each tick the
//! controller folds it together with the clock, the pointer and the trail
//! snapshot into a [`GradientUniforms`] block whose layout is plain `f32`s,
//! so it can be uploaded as raw bytes or fed to individual uniform setters.

use bytemuck::{Pod, Zeroable};
use kurbo::Point;

use crate::color::hue_to_rgb;
use crate::pointer::SurfaceSize;
use crate::ripple::RippleParams;
use crate::trail::{TRAIL_CAPACITY, TrailSnapshot};

/// User-facing look of the gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientParams {
    /// Hues (degrees) of the three base colors.
    pub hues: [f64; 3],
    /// Brightness of the base colors.
    pub brightness: f64,
    /// Film grain intensity.
    pub grain: f64,
    /// Noise scale.
    pub scale: f64,
    /// Animation speed multiplier.
    pub speed: f64,
    /// Ripple model.
    pub ripple: RippleParams,
}

impl GradientParams {
    /// The default palette: blue, magenta and the complementary third.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hues: [200.0, 320.0, 80.0],
            brightness: 1.0,
            grain: 0.05,
            scale: 1.0,
            speed: 1.0,
            ripple: RippleParams::new(),
        }
    }

    /// Replaces the hues from a ranked hue list (e.g. extracted from an
    /// image). Missing entries keep their current value.
    pub fn apply_palette(&mut self, ranked_hues: &[f64]) {
        for (slot, &hue) in self.hues.iter_mut().zip(ranked_hues) {
            if hue.is_finite() {
                *slot = hue;
            }
        }
    }
}

impl Default for GradientParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform block for one rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct GradientUniforms {
    /// First base color (RGB, alpha = 1).
    pub color_a: [f32; 4],
    /// Second base color.
    pub color_b: [f32; 4],
    /// Third base color.
    pub color_c: [f32; 4],
    /// Output surface size in pixels.
    pub resolution: [f32; 2],
    /// Current normalized pointer position.
    pub pointer: [f32; 2],
    /// Simulation time in seconds.
    pub time: f32,
    /// Film grain intensity.
    pub grain: f32,
    /// Noise scale.
    pub scale: f32,
    /// Animation speed.
    pub speed: f32,
    /// Ripple ring growth per second.
    pub ripple_speed: f32,
    /// Ripple band width.
    pub ripple_width: f32,
    /// Ripple fade-out age.
    pub ripple_lifetime: f32,
    /// Ripple peak strength.
    pub ripple_strength: f32,
    /// Ripple warp frequency.
    pub ripple_frequency: f32,
    /// Ripple warp scale.
    pub ripple_distortion: f32,
    /// Ages above this are inert.
    pub ripple_max_age: f32,
    /// Keeps the trail arrays 16-byte aligned.
    pub _pad: f32,
    /// Trail positions, `[x0, y0, x1, y1, …]`.
    pub trail_positions: [f32; TRAIL_CAPACITY * 2],
    /// Trail ages in seconds.
    pub trail_ages: [f32; TRAIL_CAPACITY],
}

impl GradientUniforms {
    /// Assembles the block for one frame.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the rendering surface consumes f32 uniforms"
    )]
    pub fn new(
        params: &GradientParams,
        time: f64,
        pointer: Point,
        trail: &TrailSnapshot<TRAIL_CAPACITY>,
        surface: SurfaceSize,
    ) -> Self {
        let color = |hue: f64| {
            let [r, g, b] = hue_to_rgb(hue, params.brightness);
            [r as f32, g as f32, b as f32, 1.0]
        };
        let mut trail_positions = [0.0; TRAIL_CAPACITY * 2];
        trail_positions.copy_from_slice(trail.flat_positions());
        let ripple = &params.ripple;

        Self {
            color_a: color(params.hues[0]),
            color_b: color(params.hues[1]),
            color_c: color(params.hues[2]),
            resolution: [surface.width as f32, surface.height as f32],
            pointer: [pointer.x as f32, pointer.y as f32],
            time: time as f32,
            grain: params.grain as f32,
            scale: params.scale as f32,
            speed: params.speed as f32,
            ripple_speed: ripple.expansion_speed as f32,
            ripple_width: ripple.band_width as f32,
            ripple_lifetime: ripple.lifetime as f32,
            ripple_strength: ripple.strength as f32,
            ripple_frequency: ripple.frequency as f32,
            ripple_distortion: ripple.distortion as f32,
            ripple_max_age: ripple.max_age as f32,
            _pad: 0.0,
            trail_positions,
            trail_ages: trail.ages,
        }
    }

    /// Returns the block as raw bytes for buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
