// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the playground.
//!
//! [`TraceSink`] has one method per event, all defaulting to no-ops, so a
//! sink only implements what it cares about.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. With the `trace`
//! feature **off**, every `Tracer` method compiles to nothing. With it
//! **on**, each method performs a single `Option` branch before dispatching.

use crate::asset::AssetKind;
use crate::error::CaptureError;
use crate::recording::SessionState;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per display refresh after the clock advances.
#[derive(Clone, Copy, Debug)]
pub struct ClockTickEvent {
    /// Host frame counter.
    pub frame_index: u64,
    /// Host time of the refresh.
    pub now: HostTime,
    /// Simulation time in seconds since the first tick.
    pub time: f64,
}

/// Emitted when the trail admits a pointer position.
#[derive(Clone, Copy, Debug)]
pub struct TrailAdmitEvent {
    /// Normalized position that was admitted.
    pub position: [f64; 2],
    /// Simulation time of the admission.
    pub time: f64,
    /// Trail length after admission.
    pub len: usize,
}

/// What happened on one recording capture tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptureOutcome {
    /// A frame was read, downscaled and queued.
    Captured,
    /// The surface was unavailable; the frame was skipped.
    Dropped,
}

/// Emitted for every recording capture tick that tried to read a frame.
#[derive(Clone, Copy, Debug)]
pub struct CaptureTickEvent {
    /// Host time the tick was scheduled for.
    pub now: HostTime,
    /// Whether a frame was captured.
    pub outcome: CaptureOutcome,
    /// Frames captured so far, including this one.
    pub captured: u32,
    /// Frames the session aims for.
    pub target: u32,
}

/// Emitted when the recording session changes state.
#[derive(Clone, Copy, Debug)]
pub struct SessionTransitionEvent {
    /// State before the transition.
    pub from: SessionState,
    /// State after the transition.
    pub to: SessionState,
    /// Host time of the transition.
    pub now: HostTime,
}

/// Emitted for each progress report from a running encode.
#[derive(Clone, Copy, Debug)]
pub struct EncodeProgressEvent {
    /// Fraction done in `[0, 1]`.
    pub progress: f32,
}

/// Emitted when a snapshot export or recording reaches a terminal state.
#[derive(Clone, Copy, Debug)]
pub struct ExportFinishedEvent<'a> {
    /// What was being produced.
    pub kind: AssetKind,
    /// Host time of completion.
    pub now: HostTime,
    /// Why it failed, if it did. `None` on success or cancellation.
    pub error: Option<&'a CaptureError>,
    /// Whether the user cancelled it.
    pub cancelled: bool,
}

/// Emitted after an asset has been handed to the sink.
#[derive(Clone, Copy, Debug)]
pub struct AssetDeliveredEvent<'a> {
    /// Container format.
    pub kind: AssetKind,
    /// Filename given to the asset.
    pub filename: &'a str,
    /// Encoded size in bytes.
    pub bytes: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the playground.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after each clock tick.
    fn on_clock_tick(&mut self, e: &ClockTickEvent) {
        _ = e;
    }

    /// Called when the trail admits a point.
    fn on_trail_admit(&mut self, e: &TrailAdmitEvent) {
        _ = e;
    }

    /// Called for each recording capture tick.
    fn on_capture_tick(&mut self, e: &CaptureTickEvent) {
        _ = e;
    }

    /// Called when the recording session changes state.
    fn on_session_transition(&mut self, e: &SessionTransitionEvent) {
        _ = e;
    }

    /// Called with encoder progress.
    fn on_encode_progress(&mut self, e: &EncodeProgressEvent) {
        _ = e;
    }

    /// Called when an export or recording finishes, fails or is cancelled.
    fn on_export_finished(&mut self, e: &ExportFinishedEvent<'_>) {
        _ = e;
    }

    /// Called after an asset reaches the sink.
    fn on_asset_delivered(&mut self, e: &AssetDeliveredEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`ClockTickEvent`].
    #[inline]
    pub fn clock_tick(&mut self, e: &ClockTickEvent) {
        dispatch!(self, on_clock_tick, e);
    }

    /// Emits a [`TrailAdmitEvent`].
    #[inline]
    pub fn trail_admit(&mut self, e: &TrailAdmitEvent) {
        dispatch!(self, on_trail_admit, e);
    }

    /// Emits a [`CaptureTickEvent`].
    #[inline]
    pub fn capture_tick(&mut self, e: &CaptureTickEvent) {
        dispatch!(self, on_capture_tick, e);
    }

    /// Emits a [`SessionTransitionEvent`].
    #[inline]
    pub fn session_transition(&mut self, e: &SessionTransitionEvent) {
        dispatch!(self, on_session_transition, e);
    }

    /// Emits an [`EncodeProgressEvent`].
    #[inline]
    pub fn encode_progress(&mut self, e: &EncodeProgressEvent) {
        dispatch!(self, on_encode_progress, e);
    }

    /// Emits an [`ExportFinishedEvent`].
    #[inline]
    pub fn export_finished(&mut self, e: &ExportFinishedEvent<'_>) {
        dispatch!(self, on_export_finished, e);
    }

    /// Emits an [`AssetDeliveredEvent`].
    #[inline]
    pub fn asset_delivered(&mut self, e: &AssetDeliveredEvent<'_>) {
        dispatch!(self, on_asset_delivered, e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_capture() -> CaptureTickEvent {
        CaptureTickEvent {
            now: HostTime(100_000),
            outcome: CaptureOutcome::Captured,
            captured: 1,
            target: 20,
        }
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_capture_tick(&sample_capture());
        sink.on_session_transition(&SessionTransitionEvent {
            from: SessionState::Idle,
            to: SessionState::Recording,
            now: HostTime(0),
        });
        sink.on_export_finished(&ExportFinishedEvent {
            kind: AssetKind::Png,
            now: HostTime(0),
            error: Some(&CaptureError::SourceUnavailable),
            cancelled: false,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.capture_tick(&sample_capture());
        tracer.encode_progress(&EncodeProgressEvent { progress: 0.5 });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            captured: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_capture_tick(&mut self, e: &CaptureTickEvent) {
                self.captured.push(e.captured);
            }
        }

        let mut sink = RecordingSink {
            captured: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.capture_tick(&sample_capture());
        drop(tracer);
        assert_eq!(sink.captured, &[1]);
    }
}
