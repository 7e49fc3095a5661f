// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation clock driven by display-refresh ticks.
//!
//! A backend tick source (e.g. `requestAnimationFrame`) emits one
//! [`FrameTick`] per display refresh. [`AnimationClock`] turns those host
//! timestamps into the simulation time the rendering surface and the trail
//! buffer share:
//!
//! ```text
//! sim_time = max(previous, tick.now - first_tick.now)   (seconds)
//! ```
//!
//! The clock is zero-based at the first tick and never runs backwards, even
//! if the host clock does. There is no pause; consumers compare deltas.

use crate::time::HostTime;

/// A frame opportunity delivered by a tick source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTick {
    /// Host time when the tick was generated.
    pub now: HostTime,
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
}

/// Converts [`FrameTick`]s into zero-based simulation seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationClock {
    origin: Option<HostTime>,
    current: f64,
    ticks: u64,
}

impl AnimationClock {
    /// Creates a clock that has not seen a tick yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            origin: None,
            current: 0.0,
            ticks: 0,
        }
    }

    /// Advances the clock to the given tick and returns the simulation time
    /// in seconds.
    pub fn tick(&mut self, tick: &FrameTick) -> f64 {
        let origin = *self.origin.get_or_insert(tick.now);
        let elapsed = tick.now.saturating_duration_since(origin).as_secs_f64();
        if elapsed > self.current {
            self.current = elapsed;
        }
        self.ticks = self.ticks.saturating_add(1);
        self.current
    }

    /// Returns the most recent simulation time (zero before the first tick).
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.current
    }

    /// Returns how many ticks the clock has consumed.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Returns `true` once the first tick has been seen.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.origin.is_some()
    }

    /// Forgets the origin; the next tick becomes time zero again.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
