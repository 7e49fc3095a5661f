// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ripple contribution model.
//!
//! This is the aggregation the rendering surface runs per sample point over
//! a [`TrailSnapshot`]. It lives here as a CPU reference so the trail and
//! capture subsystems can be checked against the exact inputs the surface
//! expects, and so headless hosts can render the effect without a GPU.
//!
//! For each live slot `i` with position `pᵢ` and age `aᵢ`:
//!
//! ```text
//! rᵢ    = aᵢ · expansion_speed
//! ring  = 1 - smoothstep(0, band_width, | |u - pᵢ| - rᵢ |)
//! fade  = 1 - smoothstep(0, lifetime, aᵢ)
//! cᵢ    = ring · fade · strength
//! ```
//!
//! Contributions are summed. Slots with a negative x or an age beyond
//! `max_age` are sentinel slots and contribute nothing.

use kurbo::{Point, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::trail::TrailSnapshot;

/// Tunables of the ripple model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleParams {
    /// Ring radius growth, normalized units per second.
    pub expansion_speed: f64,
    /// Width of the ring falloff band.
    pub band_width: f64,
    /// Age (seconds) by which a ripple has fully faded.
    pub lifetime: f64,
    /// Peak contribution of one ring.
    pub strength: f64,
    /// Spatial frequency of the radial warp.
    pub frequency: f64,
    /// Scale of the radial warp relative to the contribution.
    pub distortion: f64,
    /// Ages above this are treated as sentinel slots.
    pub max_age: f64,
}

impl RippleParams {
    /// The reference look.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expansion_speed: 0.4,
            band_width: 0.08,
            lifetime: 3.0,
            strength: 0.3,
            frequency: 20.0,
            distortion: 0.05,
            max_age: 10.0,
        }
    }
}

impl Default for RippleParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregated ripple response at one sample point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RippleSample {
    /// Summed ring contributions; perturbs color-region boundaries.
    pub intensity: f64,
    /// Summed radial warp applied to the sample coordinate.
    pub distortion: Vec2,
}

/// GLSL `smoothstep`.
#[must_use]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge1 == edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Contribution of a single trail entry at distance `distance` with age
/// `age`, before warp.
#[must_use]
pub fn ring_contribution(distance: f64, age: f64, params: &RippleParams) -> f64 {
    let radius = age * params.expansion_speed;
    let ring = 1.0 - smoothstep(0.0, params.band_width, (distance - radius).abs());
    let fade = 1.0 - smoothstep(0.0, params.lifetime, age);
    ring * fade * params.strength
}

/// Sums every live slot's contribution at `uv`, at simulation time `time`.
#[must_use]
pub fn aggregate<const N: usize>(
    uv: Point,
    snapshot: &TrailSnapshot<N>,
    params: &RippleParams,
    time: f64,
) -> RippleSample {
    let mut sample = RippleSample::default();
    for (pos, &age) in snapshot.positions.iter().zip(&snapshot.ages) {
        let age = f64::from(age);
        if pos[0] < 0.0 || age > params.max_age {
            continue;
        }
        let center = Point::new(f64::from(pos[0]), f64::from(pos[1]));
        let offset = uv - center;
        let distance = offset.hypot();
        let contribution = ring_contribution(distance, age, params);
        sample.intensity += contribution;

        if distance > 0.0 {
            let direction = offset / distance;
            let wave = (time * 3.0 + distance * params.frequency).sin();
            sample.distortion += direction * (contribution * params.distortion * wave);
        }
    }
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::TrailBuffer;

    #[test]
    fn smoothstep_matches_glsl() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-12, "midpoint");
        assert_eq!(smoothstep(1.0, 1.0, 0.5), 0.0, "degenerate edge, below");
    }

    #[test]
    fn ring_peaks_at_radius() {
        let params = RippleParams::new();
        let age = 1.0;
        let radius = age * params.expansion_speed;
        let on_ring = ring_contribution(radius, age, &params);
        let off_ring = ring_contribution(radius + 0.2, age, &params);
        assert!(on_ring > 0.0, "on ring: {on_ring}");
        assert_eq!(off_ring, 0.0, "outside the band");
        let fade = 1.0 - smoothstep(0.0, params.lifetime, age);
        assert!((on_ring - params.strength * fade).abs() < 1e-12, "peak = strength · fade");
    }

    #[test]
    fn faded_out_after_lifetime() {
        let params = RippleParams::new();
        let age = params.lifetime + 0.5;
        let radius = age * params.expansion_speed;
        assert_eq!(ring_contribution(radius, age, &params), 0.0);
    }

    #[test]
    fn sentinel_slots_are_inert() {
        let params = RippleParams::new();
        let empty = TrailSnapshot::<8>::empty();
        // A sentinel at (-1, -1) with age 999 would otherwise sit on its own
        // ring for some sample points.
        let sample = aggregate(Point::new(0.0, 0.0), &empty, &params, 1.0);
        assert_eq!(sample, RippleSample::default());
    }

    #[test]
    fn contributions_are_summed_not_maxed() {
        let params = RippleParams::new();
        let mut one = TrailBuffer::<8>::default();
        one.record(Point::new(0.5, 0.5), 0.0);

        let mut two = TrailBuffer::<8>::default();
        two.record(Point::new(0.5, 0.5), 0.0);
        two.record(Point::new(0.5, 0.5), 0.2);

        // At t = 0.5 the rings have radii 0.2 and 0.12; a sample 0.16 away
        // sits inside both bands.
        let now = 0.5;
        let uv = Point::new(0.66, 0.5);
        let a = aggregate(uv, &one.snapshot(now), &params, now).intensity;
        let b = aggregate(uv, &two.snapshot(now), &params, now).intensity;
        let second_alone = ring_contribution(0.16, 0.3, &params);
        assert!(a > 0.0, "first ring reaches the sample");
        assert!(second_alone > 0.0, "second ring reaches the sample");
        assert!(b > a, "summed, not maxed");
        assert!((b - (a + second_alone)).abs() < 1e-5, "sum: {b} vs {a} + {second_alone}");
    }

    #[test]
    fn coincident_sample_has_no_direction() {
        let params = RippleParams::new();
        let mut trail = TrailBuffer::<8>::default();
        // 0.25 survives the trip through f32 unchanged.
        trail.record(Point::new(0.25, 0.25), 0.0);
        let sample = aggregate(Point::new(0.25, 0.25), &trail.snapshot(0.0), &params, 0.0);
        assert!(sample.intensity > 0.0, "ring of radius 0 covers its center");
        assert_eq!(sample.distortion, Vec2::ZERO, "no NaN from normalizing zero");
    }
}
