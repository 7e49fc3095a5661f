// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded pointer-trail history.
//!
//! [`TrailBuffer`] keeps the last `N` admitted pointer positions in
//! chronological order. A position is admitted when it is the first one, or
//! when enough time has passed **or** the pointer has moved far enough since
//! the last admitted point; jitter below both thresholds is dropped so rapid
//! pointer events cannot flood the buffer.
//!
//! Every render tick the buffer is exported as a [`TrailSnapshot`]: two
//! fixed-length parallel arrays (positions and ages) in which unused slots
//! hold [`SENTINEL_POSITION`] and [`SENTINEL_AGE`]. The ripple aggregation on
//! the rendering surface treats sentinel slots as inert.

use kurbo::Point;

/// Number of trail points the rendering surface consumes.
pub const TRAIL_CAPACITY: usize = 8;

/// Position written to unused snapshot slots.
pub const SENTINEL_POSITION: [f32; 2] = [-1.0, -1.0];

/// Age written to unused snapshot slots.
pub const SENTINEL_AGE: f32 = 999.0;

/// How displacement between two trail points is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    /// Largest per-axis displacement. A move counts once either axis exceeds
    /// the threshold.
    #[default]
    Chebyshev,
    /// Straight-line displacement.
    Euclidean,
}

impl DistanceMetric {
    /// Measures the displacement between `a` and `b`.
    #[must_use]
    pub fn distance(self, a: Point, b: Point) -> f64 {
        match self {
            Self::Chebyshev => (a.x - b.x).abs().max((a.y - b.y).abs()),
            Self::Euclidean => (a - b).hypot(),
        }
    }
}

/// Admission thresholds for [`TrailBuffer::record`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailConfig {
    /// Seconds that must pass since the last admitted point.
    pub min_interval: f64,
    /// Normalized displacement that must be exceeded since the last admitted
    /// point.
    pub min_distance: f64,
    /// Metric used for `min_distance`.
    pub metric: DistanceMetric,
}

impl TrailConfig {
    /// 100 ms or 2% of the surface, measured per axis.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_interval: 0.1,
            min_distance: 0.02,
            metric: DistanceMetric::Chebyshev,
        }
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A timestamped, normalized pointer position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    /// Position in `[0, 1]²`, origin at the bottom-left of the surface.
    pub position: Point,
    /// Simulation time (seconds) at which the point was admitted.
    pub captured_at: f64,
}

impl TrailPoint {
    const EMPTY: Self = Self {
        position: Point::ZERO,
        captured_at: 0.0,
    };

    /// Returns the age of this point at simulation time `now`, never
    /// negative.
    #[must_use]
    pub fn age_at(&self, now: f64) -> f64 {
        (now - self.captured_at).max(0.0)
    }
}

/// Fixed-capacity FIFO of [`TrailPoint`]s, oldest first.
#[derive(Clone, Debug)]
pub struct TrailBuffer<const N: usize = TRAIL_CAPACITY> {
    points: [TrailPoint; N],
    /// Slot of the oldest point.
    head: usize,
    len: usize,
    config: TrailConfig,
}

impl<const N: usize> Default for TrailBuffer<N> {
    fn default() -> Self {
        Self::new(TrailConfig::new())
    }
}

impl<const N: usize> TrailBuffer<N> {
    /// Creates an empty buffer with the given admission thresholds.
    #[must_use]
    pub const fn new(config: TrailConfig) -> Self {
        Self {
            points: [TrailPoint::EMPTY; N],
            head: 0,
            len: 0,
            config,
        }
    }

    /// Returns the admission thresholds.
    #[must_use]
    pub const fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// Returns the number of points currently held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no point has been admitted (or all were cleared).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum number of points held.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the most recently admitted point.
    #[must_use]
    pub fn last(&self) -> Option<&TrailPoint> {
        if self.len == 0 {
            return None;
        }
        Some(&self.points[(self.head + self.len - 1) % N])
    }

    /// Iterates the held points oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> + '_ {
        (0..self.len).map(move |i| &self.points[(self.head + i) % N])
    }

    /// Offers a position observed at simulation time `time`.
    ///
    /// `position` must already be normalized and clamped to `[0, 1]²` (see
    /// [`normalize_pointer`](crate::pointer::normalize_pointer)). Returns
    /// `true` if the point was admitted; when the buffer is full the oldest
    /// point is evicted.
    pub fn record(&mut self, position: Point, time: f64) -> bool {
        if N == 0 {
            return false;
        }
        if let Some(last) = self.last() {
            let elapsed = time - last.captured_at;
            let moved = self.config.metric.distance(position, last.position);
            if !(elapsed > self.config.min_interval || moved > self.config.min_distance) {
                return false;
            }
        }

        let point = TrailPoint {
            position,
            captured_at: time,
        };
        if self.len < N {
            self.points[(self.head + self.len) % N] = point;
            self.len += 1;
        } else {
            self.points[self.head] = point;
            self.head = (self.head + 1) % N;
        }
        true
    }

    /// Exports the buffer for the rendering surface at simulation time
    /// `now`. Does not mutate the buffer.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the rendering surface consumes f32 uniforms"
    )]
    pub fn snapshot(&self, now: f64) -> TrailSnapshot<N> {
        let mut snapshot = TrailSnapshot::empty();
        for (slot, point) in self.iter().enumerate() {
            snapshot.positions[slot] = [point.position.x as f32, point.position.y as f32];
            snapshot.ages[slot] = point.age_at(now) as f32;
        }
        snapshot
    }

    /// Drops every held point.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

/// Fixed-length export of a [`TrailBuffer`], ready for uniform upload.
///
/// Slots `0..len` hold live points oldest → newest; the remaining slots hold
/// sentinels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSnapshot<const N: usize = TRAIL_CAPACITY> {
    /// Per-slot `[x, y]`.
    pub positions: [[f32; 2]; N],
    /// Per-slot age in seconds.
    pub ages: [f32; N],
}

impl<const N: usize> TrailSnapshot<N> {
    /// A snapshot with every slot set to the sentinels.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            positions: [SENTINEL_POSITION; N],
            ages: [SENTINEL_AGE; N],
        }
    }

    /// Returns positions as a flat `[x0, y0, x1, y1, …]` slice of length `2N`.
    #[must_use]
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Returns `true` if slot `i` holds a live point.
    #[must_use]
    pub fn is_live(&self, i: usize) -> bool {
        self.positions
            .get(i)
            .is_some_and(|p| p[0] >= 0.0 && self.ages[i] < SENTINEL_AGE)
    }

    /// Number of live slots.
    #[must_use]
    pub fn live_count(&self) -> usize {
        (0..N).filter(|&i| self.is_live(i)).count()
    }
}

impl<const N: usize> Default for TrailSnapshot<N> {
    fn default() -> Self {
        Self::empty()
    }
}
