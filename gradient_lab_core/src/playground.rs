// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The controller the UI talks to.
//!
//! [`Playground`] owns every piece of temporal state: the animation clock,
//! the pointer trail, the timer queue, the attached surfaces, the snapshot
//! exporter and the recording session. Hosts drive it from a single event
//! loop:
//!
//! - once per display refresh, call [`Playground::on_frame`] and hand the
//!   returned uniforms to the rendering surface;
//! - forward pointer movement to [`Playground::on_pointer_move`];
//! - call [`Playground::advance`] whenever [`Playground::next_deadline`]
//!   passes (`on_frame` does this too).
//!
//! Nothing here blocks or sleeps.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::asset::{AssetKind, AssetSink, EncodedAsset, FilenameClock};
use crate::clock::{AnimationClock, FrameTick};
use crate::encode::{AnimatedEncoder, StillEncoder};
use crate::error::CaptureError;
use crate::export::{ExportConfig, SnapshotExporter};
use crate::pointer::{SurfaceSize, normalize_pointer};
use crate::recording::{
    RecordingConfig, RecordingOptions, RecordingSession, SessionState, SessionTimer,
};
use crate::source::{CaptureSources, FrameSource, SourceId};
use crate::time::HostTime;
use crate::timer::{TimerId, TimerQueue};
use crate::trace::{
    AssetDeliveredEvent, ClockTickEvent, ExportFinishedEvent, NoopSink, TraceSink, Tracer,
    TrailAdmitEvent,
};
use crate::trail::{TrailBuffer, TrailConfig};
use crate::uniforms::{GradientParams, GradientUniforms};

/// Events carried by the controller's timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaygroundTimer {
    /// The snapshot settle delay elapsed.
    SnapshotSettle,
    /// A recording session timer.
    Session(SessionTimer),
}

impl From<SessionTimer> for PlaygroundTimer {
    fn from(timer: SessionTimer) -> Self {
        Self::Session(timer)
    }
}

/// Controller configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaygroundConfig {
    /// Trail admission thresholds.
    pub trail: TrailConfig,
    /// Snapshot settle delay.
    pub export: ExportConfig,
    /// Recording limits.
    pub recording: RecordingConfig,
    /// Unix time in milliseconds corresponding to host time zero. Used only
    /// for filenames.
    pub origin_unix_ms: u64,
}

impl PlaygroundConfig {
    /// Default thresholds and limits, filenames stamped from the Unix epoch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            trail: TrailConfig::new(),
            export: ExportConfig::new(),
            recording: RecordingConfig::new(),
            origin_unix_ms: 0,
        }
    }
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What the UI observes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaygroundStatus {
    /// A recording is capturing or encoding.
    pub is_recording: bool,
    /// Encoder progress in `[0, 1]`; zero while still capturing.
    pub progress: f32,
    /// Share of the target frames captured so far.
    pub capture_progress: f32,
    /// A snapshot export is in flight.
    pub is_exporting: bool,
}

/// The interactive gradient controller.
pub struct Playground {
    clock: AnimationClock,
    trail: TrailBuffer,
    pointer: Point,
    surface: SurfaceSize,
    params: GradientParams,
    now: HostTime,
    timers: TimerQueue<PlaygroundTimer>,
    sources: CaptureSources,
    exporter: SnapshotExporter,
    session: RecordingSession,
    still: Box<dyn StillEncoder>,
    animated: Box<dyn AnimatedEncoder>,
    sink: Box<dyn AssetSink>,
    trace: Box<dyn TraceSink>,
    filenames: FilenameClock,
    last_error: Option<CaptureError>,
}

impl fmt::Debug for Playground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playground")
            .field("clock", &self.clock)
            .field("trail", &self.trail.len())
            .field("pointer", &self.pointer)
            .field("surface", &self.surface)
            .field("now", &self.now)
            .field("timers", &self.timers.len())
            .field("sources", &self.sources)
            .field("exporter", &self.exporter)
            .field("session", &self.session)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl Playground {
    /// Creates a controller that encodes with the given encoders and hands
    /// finished assets to `sink`.
    #[must_use]
    pub fn new(
        config: PlaygroundConfig,
        still: Box<dyn StillEncoder>,
        animated: Box<dyn AnimatedEncoder>,
        sink: Box<dyn AssetSink>,
    ) -> Self {
        Self {
            clock: AnimationClock::new(),
            trail: TrailBuffer::new(config.trail),
            pointer: Point::new(0.5, 0.5),
            surface: SurfaceSize::default(),
            params: GradientParams::new(),
            now: HostTime::default(),
            timers: TimerQueue::new(),
            sources: CaptureSources::new(),
            exporter: SnapshotExporter::new(config.export),
            session: RecordingSession::new(config.recording),
            still,
            animated,
            sink,
            trace: Box::new(NoopSink),
            filenames: FilenameClock::new(config.origin_unix_ms),
            last_error: None,
        }
    }

    /// Routes trace events to `sink`. Events are only emitted with the
    /// `trace` feature.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = sink;
        self
    }

    // -- Rendering -----------------------------------------------------------

    /// Handles one display refresh: advances the clock, fires due timers,
    /// polls any encode, and returns the uniforms for this frame.
    pub fn on_frame(&mut self, tick: &FrameTick) -> GradientUniforms {
        let time = self.clock.tick(tick);
        Tracer::new(&mut *self.trace).clock_tick(&ClockTickEvent {
            frame_index: tick.frame_index,
            now: tick.now,
            time,
        });
        self.advance(tick.now);
        self.uniforms()
    }

    /// Uniforms for the current clock time without advancing anything.
    #[must_use]
    pub fn uniforms(&self) -> GradientUniforms {
        let time = self.clock.now();
        GradientUniforms::new(
            &self.params,
            time,
            self.pointer,
            &self.trail.snapshot(time),
            self.surface,
        )
    }

    /// Records pointer movement given in surface pixels, origin top-left.
    ///
    /// Returns whether the trail admitted the position.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let position = normalize_pointer(x, y, self.surface);
        self.pointer = position;
        let time = self.clock.now();
        let admitted = self.trail.record(position, time);
        if admitted {
            Tracer::new(&mut *self.trace).trail_admit(&TrailAdmitEvent {
                position: [position.x, position.y],
                time,
                len: self.trail.len(),
            });
        }
        admitted
    }

    /// Updates the surface size used for pointer normalization and the
    /// resolution uniform.
    pub fn set_surface_size(&mut self, size: SurfaceSize) {
        self.surface = size;
    }

    /// Current surface size.
    #[must_use]
    pub const fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    /// The gradient parameters.
    #[must_use]
    pub const fn params(&self) -> &GradientParams {
        &self.params
    }

    /// Mutable access for the control panel.
    pub fn params_mut(&mut self) -> &mut GradientParams {
        &mut self.params
    }

    /// The pointer trail.
    #[must_use]
    pub const fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// The animation clock.
    #[must_use]
    pub const fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    // -- Surfaces ------------------------------------------------------------

    /// Attaches a capturable surface. The most recent attachment is the one
    /// captured.
    pub fn attach_source(&mut self, source: Box<dyn FrameSource>) -> SourceId {
        self.sources.attach(source)
    }

    /// Detaches a surface. Returns `false` if it was not attached.
    pub fn detach_source(&mut self, id: SourceId) -> bool {
        self.sources.detach(id)
    }

    // -- Timers --------------------------------------------------------------

    /// When the host should next call [`advance`](Self::advance).
    ///
    /// While an encode is running this is the current time: keep calling
    /// `advance` (once per frame is plenty) until it finishes.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        if self.session.state() == SessionState::Encoding {
            return Some(self.now);
        }
        self.timers.next_deadline()
    }

    /// Fires every timer due at or before `now`, then polls a running
    /// encode once.
    pub fn advance(&mut self, now: HostTime) {
        if now > self.now {
            self.now = now;
        }
        let now = self.now;

        while let Some((id, at, event)) = self.timers.pop_due(now) {
            match event {
                PlaygroundTimer::SnapshotSettle => self.finish_snapshot(id),
                PlaygroundTimer::Session(SessionTimer::CaptureTick) => {
                    let mut tracer = Tracer::new(&mut *self.trace);
                    let result = self.session.on_capture_tick(
                        id,
                        at,
                        &mut self.timers,
                        &self.sources,
                        &*self.animated,
                        &mut tracer,
                    );
                    self.settle_recording(result);
                }
                PlaygroundTimer::Session(SessionTimer::Timeout) => {
                    let mut tracer = Tracer::new(&mut *self.trace);
                    let result = self.session.on_timeout(
                        id,
                        at,
                        &mut self.timers,
                        &*self.animated,
                        &mut tracer,
                    );
                    self.settle_recording(result);
                }
            }
        }

        let mut tracer = Tracer::new(&mut *self.trace);
        if let Some(result) = self.session.poll(now, &mut self.timers, &mut tracer) {
            match result {
                Ok(bytes) => self.deliver(AssetKind::Gif, bytes),
                Err(err) => self.fail(AssetKind::Gif, err),
            }
        }
    }

    // -- Capture -------------------------------------------------------------

    /// Requests a still snapshot. The surface is read after the settle
    /// delay, on a later [`advance`](Self::advance).
    ///
    /// # Errors
    ///
    /// [`CaptureError::ExportInProgress`] if one is already pending.
    pub fn export_snapshot(&mut self, now: HostTime) -> Result<(), CaptureError> {
        if now > self.now {
            self.now = now;
        }
        self.exporter
            .request(self.now, &mut self.timers, PlaygroundTimer::SnapshotSettle)
            .map(|_| ())
    }

    /// Starts an animated recording.
    ///
    /// # Errors
    ///
    /// [`CaptureError::InvalidOptions`] or [`CaptureError::SessionActive`].
    pub fn start_recording(
        &mut self,
        options: RecordingOptions,
        now: HostTime,
    ) -> Result<(), CaptureError> {
        if now > self.now {
            self.now = now;
        }
        let mut tracer = Tracer::new(&mut *self.trace);
        self.session
            .start(options, self.now, &mut self.timers, &mut tracer)
    }

    /// Cancels the active recording or encode. Returns `false` if nothing
    /// was active. No asset is delivered afterwards.
    pub fn cancel_recording(&mut self) -> bool {
        let now = self.now;
        let mut tracer = Tracer::new(&mut *self.trace);
        let cancelled = self.session.cancel(now, &mut self.timers, &mut tracer);
        if cancelled {
            tracer.export_finished(&ExportFinishedEvent {
                kind: AssetKind::Gif,
                now,
                error: None,
                cancelled: true,
            });
        }
        cancelled
    }

    /// Observable recording and export state.
    #[must_use]
    pub fn status(&self) -> PlaygroundStatus {
        PlaygroundStatus {
            is_recording: self.session.is_active(),
            progress: self.session.progress(),
            capture_progress: self.session.capture_progress(),
            is_exporting: self.exporter.is_exporting(),
        }
    }

    /// Takes the most recent failure of an export or recording that ended
    /// inside [`advance`](Self::advance).
    pub fn take_error(&mut self) -> Option<CaptureError> {
        self.last_error.take()
    }

    fn finish_snapshot(&mut self, fired: TimerId) {
        match self
            .exporter
            .complete(fired, &self.sources, &*self.still)
        {
            Some(Ok(bytes)) => self.deliver(AssetKind::Png, bytes),
            Some(Err(err)) => self.fail(AssetKind::Png, err),
            None => {}
        }
    }

    fn settle_recording(&mut self, result: Result<(), CaptureError>) {
        if let Err(err) = result {
            self.fail(AssetKind::Gif, err);
        }
    }

    fn deliver(&mut self, kind: AssetKind, bytes: Vec<u8>) {
        let now = self.now;
        let filename = self.filenames.filename(kind, now);
        let size = bytes.len();
        let asset = EncodedAsset {
            kind,
            filename,
            bytes,
        };
        let delivered_name = asset.filename.clone();
        match self.sink.deliver(asset) {
            Ok(()) => {
                let mut tracer = Tracer::new(&mut *self.trace);
                tracer.asset_delivered(&AssetDeliveredEvent {
                    kind,
                    filename: &delivered_name,
                    bytes: size,
                });
                tracer.export_finished(&ExportFinishedEvent {
                    kind,
                    now,
                    error: None,
                    cancelled: false,
                });
            }
            Err(err) => self.fail(kind, err),
        }
    }

    fn fail(&mut self, kind: AssetKind, err: CaptureError) {
        Tracer::new(&mut *self.trace).export_finished(&ExportFinishedEvent {
            kind,
            now: self.now,
            error: Some(&err),
            cancelled: false,
        });
        self.last_error = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::CollectingSink;
    use crate::encode::{AnimationOptions, EncodeJob, EncodePoll};
    use crate::error::EncodeError;
    use crate::frame::PixelFrame;
    use crate::time::Duration;
    use crate::trail::{SENTINEL_AGE, SENTINEL_POSITION};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    struct EchoPng;

    impl StillEncoder for EchoPng {
        fn encode_png(&self, frame: &PixelFrame) -> Result<Vec<u8>, EncodeError> {
            Ok(frame.as_bytes()[..4].to_vec())
        }
    }

    /// Finishes on the first poll with one byte per frame.
    #[derive(Clone, Default)]
    struct CountingGif {
        begun: Rc<Cell<usize>>,
        frames: Rc<Cell<usize>>,
    }

    struct DoneJob(Option<Vec<u8>>);

    impl EncodeJob for DoneJob {
        fn poll(&mut self) -> EncodePoll {
            EncodePoll::Finished(self.0.take().ok_or(EncodeError::WorkerLost))
        }

        fn cancel(&mut self) {
            self.0 = None;
        }
    }

    impl AnimatedEncoder for CountingGif {
        fn begin(
            &self,
            frames: Vec<PixelFrame>,
            _: &AnimationOptions,
        ) -> Result<Box<dyn EncodeJob>, EncodeError> {
            self.begun.set(self.begun.get() + 1);
            self.frames.set(frames.len());
            Ok(Box::new(DoneJob(Some(vec![0; frames.len()]))))
        }
    }

    struct Fixture {
        playground: Playground,
        assets: CollectingSink,
        gif: CountingGif,
    }

    fn fixture() -> Fixture {
        let assets = CollectingSink::new();
        let gif = CountingGif::default();
        let config = PlaygroundConfig {
            origin_unix_ms: 1_700_000_000_000,
            ..PlaygroundConfig::new()
        };
        let mut playground = Playground::new(
            config,
            Box::new(EchoPng),
            Box::new(gif.clone()),
            Box::new(assets.clone()),
        );
        playground.set_surface_size(SurfaceSize::new(100, 100));
        Fixture {
            playground,
            assets,
            gif,
        }
    }

    fn surface() -> Box<dyn FrameSource> {
        Box::new(|| Some(PixelFrame::filled(64, 48, [200, 100, 50, 255])))
    }

    /// Advances in 10 ms steps up to and including `until`.
    fn run(playground: &mut Playground, from: HostTime, until: HostTime) {
        let mut now = from;
        while now <= until {
            playground.advance(now);
            now = now + Duration::from_millis(10);
        }
    }

    #[test]
    fn trail_stays_bounded_and_ordered() {
        let mut f = fixture();
        for i in 0..40 {
            f.playground.on_frame(&FrameTick {
                now: HostTime(i * 200_000),
                frame_index: i,
            });
            f.playground.on_pointer_move((i % 10) as f64 * 10.0, 50.0);
            assert!(f.playground.trail().len() <= 8, "trail overflowed at {i}");
        }
        let times: Vec<f64> = f.playground.trail().iter().map(|p| p.captured_at).collect();
        assert_eq!(times.len(), 8);
        assert!(times.windows(2).all(|w| w[0] < w[1]), "chronological: {times:?}");
        assert!((times[7] - 7.8).abs() < 1e-9, "newest is the last admitted");
    }

    #[test]
    fn pointer_jitter_is_thresholded() {
        let mut f = fixture();
        assert!(f.playground.on_pointer_move(10.0, 10.0), "first point");
        assert!(!f.playground.on_pointer_move(11.0, 11.0), "jitter ignored");
        assert_eq!(f.playground.trail().len(), 1);
        assert!(f.playground.on_pointer_move(14.0, 10.0), "moved 0.04 in x");
        assert_eq!(f.playground.trail().len(), 2);
    }

    #[test]
    fn uniforms_pad_unused_trail_slots() {
        let mut f = fixture();
        f.playground.on_pointer_move(10.0, 10.0);
        f.playground.on_pointer_move(50.0, 50.0);
        f.playground.on_pointer_move(90.0, 90.0);
        let uniforms = f.playground.on_frame(&FrameTick {
            now: HostTime(0),
            frame_index: 0,
        });
        assert_eq!(&uniforms.trail_positions[..2], &[0.1, 0.9], "y flipped");
        for slot in 3..8 {
            assert_eq!(uniforms.trail_ages[slot], SENTINEL_AGE, "age slot {slot}");
            assert_eq!(
                uniforms.trail_positions[slot * 2..slot * 2 + 2],
                SENTINEL_POSITION,
                "position slot {slot}"
            );
        }
        assert_eq!(uniforms.resolution, [100.0, 100.0]);
    }

    #[test]
    fn recording_captures_target_then_delivers() {
        let mut f = fixture();
        f.playground.attach_source(surface());
        f.playground
            .start_recording(RecordingOptions::new(), HostTime(0))
            .expect("idle");
        assert!(f.playground.status().is_recording, "recording");
        assert_eq!(f.playground.status().progress, 0.0, "coarse progress while capturing");

        run(&mut f.playground, HostTime(0), HostTime(2_500_000));

        assert_eq!(f.gif.begun.get(), 1, "encoded once");
        assert_eq!(f.gif.frames.get(), 20, "exactly 20 frames");
        let assets = f.assets.take();
        assert_eq!(assets.len(), 1, "one asset delivered");
        assert_eq!(assets[0].kind, AssetKind::Gif);
        assert_eq!(assets[0].filename, "gradient-animated-1700000002100.gif");
        assert_eq!(assets[0].bytes.len(), 20);
        assert!(!f.playground.status().is_recording, "back to idle");
        assert!(f.playground.take_error().is_none());
        assert!(f.playground.next_deadline().is_none(), "no timers left behind");
    }

    #[test]
    fn cancelled_recording_ignores_stray_timers() {
        let mut f = fixture();
        f.playground.attach_source(surface());
        f.playground
            .start_recording(RecordingOptions::new(), HostTime(0))
            .expect("idle");
        run(&mut f.playground, HostTime(0), HostTime(1_000_000));
        assert!(f.playground.cancel_recording(), "was recording");
        assert!(!f.playground.cancel_recording(), "second cancel is a no-op");

        let before = f.playground.status();
        run(&mut f.playground, HostTime(1_000_000), HostTime(3_000_000));
        assert_eq!(f.playground.status(), before, "no state change after cancel");
        assert_eq!(before.progress, 0.0);
        assert!(!before.is_recording);
        assert!(f.assets.is_empty(), "no asset delivered");
        assert_eq!(f.gif.begun.get(), 0, "encoder never invoked");
        assert!(f.playground.take_error().is_none(), "cancel is not an error");
    }

    #[test]
    fn recording_without_surface_reports_no_frames() {
        let mut f = fixture();
        f.playground
            .start_recording(RecordingOptions::new(), HostTime(0))
            .expect("idle");
        run(&mut f.playground, HostTime(0), HostTime(3_000_000));

        assert_eq!(f.playground.take_error(), Some(CaptureError::NoFramesCaptured));
        assert_eq!(f.gif.begun.get(), 0, "encoder never invoked");
        assert!(f.assets.is_empty());
        assert!(!f.playground.status().is_recording);
    }

    #[test]
    fn second_recording_is_rejected_while_active() {
        let mut f = fixture();
        f.playground.attach_source(surface());
        f.playground
            .start_recording(RecordingOptions::new(), HostTime(0))
            .expect("idle");
        assert_eq!(
            f.playground
                .start_recording(RecordingOptions::new(), HostTime(50_000)),
            Err(CaptureError::SessionActive)
        );
        run(&mut f.playground, HostTime(0), HostTime(2_500_000));
        assert_eq!(f.assets.len(), 1, "the first recording still completes");
    }

    #[test]
    fn snapshot_round_trip() {
        let mut f = fixture();
        let id = f.playground.attach_source(surface());

        f.playground.export_snapshot(HostTime(1_000_000)).expect("idle");
        assert!(f.playground.status().is_exporting, "set on request");
        assert_eq!(
            f.playground.export_snapshot(HostTime(1_010_000)),
            Err(CaptureError::ExportInProgress)
        );
        assert_eq!(f.playground.next_deadline(), Some(HostTime(1_100_000)));

        f.playground.advance(HostTime(1_050_000));
        assert!(f.playground.status().is_exporting, "still settling");
        f.playground.advance(HostTime(1_100_000));
        assert!(!f.playground.status().is_exporting, "cleared on success");

        let assets = f.assets.take();
        assert_eq!(assets.len(), 1, "exactly one asset");
        assert_eq!(assets[0].filename, "gradient-1700000001100.png");
        assert_eq!(assets[0].bytes, [200, 100, 50, 255], "full-fidelity pixels");

        assert!(f.playground.detach_source(id));
        f.playground.export_snapshot(HostTime(2_000_000)).expect("idle");
        assert!(f.playground.status().is_exporting);
        f.playground.advance(HostTime(2_200_000));
        assert!(!f.playground.status().is_exporting, "cleared on failure");
        assert!(f.assets.is_empty(), "nothing delivered");
        assert_eq!(f.playground.take_error(), Some(CaptureError::SourceUnavailable));
    }

    #[test]
    fn on_frame_starts_the_clock_at_zero() {
        let mut f = fixture();
        let first = f.playground.on_frame(&FrameTick {
            now: HostTime(5_000_000),
            frame_index: 0,
        });
        let second = f.playground.on_frame(&FrameTick {
            now: HostTime(5_500_000),
            frame_index: 1,
        });
        assert_eq!(first.time, 0.0, "zero-based");
        assert!((second.time - 0.5).abs() < 1e-6, "got {}", second.time);
    }
}
