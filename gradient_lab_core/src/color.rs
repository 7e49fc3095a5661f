// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hue/brightness to RGB conversion for the gradient's base colors.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Saturation used for every base color.
pub const BASE_SATURATION: f64 = 0.6;

/// Converts HSV (each component in `[0, 1]`) to linear RGB in `[0, 1]`.
///
/// `h` wraps, so `1.0` is the same hue as `0.0`.
#[must_use]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [f64; 3] {
    let h = h - h.floor();
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h * 6.0 {
        s if s < 1.0 => (c, x, 0.0),
        s if s < 2.0 => (x, c, 0.0),
        s if s < 3.0 => (0.0, c, x),
        s if s < 4.0 => (0.0, x, c),
        s if s < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

/// Converts a hue in degrees and a brightness into a base color.
#[must_use]
pub fn hue_to_rgb(hue_degrees: f64, brightness: f64) -> [f64; 3] {
    hsv_to_rgb(hue_degrees / 360.0, BASE_SATURATION, brightness)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn primaries() {
        assert!(close(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]), "red");
        assert!(close(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0.0, 1.0, 0.0]), "green");
        assert!(close(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0.0, 0.0, 1.0]), "blue");
    }

    #[test]
    fn hue_wraps() {
        assert!(close(hue_to_rgb(360.0, 1.0), hue_to_rgb(0.0, 1.0)), "360° = 0°");
        assert!(close(hue_to_rgb(-120.0, 1.0), hue_to_rgb(240.0, 1.0)), "negative hue");
    }

    #[test]
    fn base_saturation_and_brightness() {
        let [r, g, b] = hue_to_rgb(0.0, 1.0);
        assert!((r - 1.0).abs() < 1e-9, "r = {r}");
        assert!((g - 0.4).abs() < 1e-9, "g = {g}");
        assert!((b - 0.4).abs() < 1e-9, "b = {b}");
        assert!(close(hue_to_rgb(200.0, 0.0), [0.0, 0.0, 0.0]), "black");
    }
}
