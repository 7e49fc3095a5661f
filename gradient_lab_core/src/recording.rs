// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed multi-frame capture.
//!
//! A [`RecordingSession`] moves through `Idle → Recording → Encoding → Idle`.
//! While recording it owns two timers: a repeating capture tick at the
//! requested framerate and an absolute timeout a little past the requested
//! duration. Either one can finalize the session; whichever fires second
//! finds its handle already released and does nothing.
//!
//! Every exit path (finish, cancel, failure) goes through one teardown that
//! cancels both timers, drops buffered frames and any encode job, and
//! returns to `Idle`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::encode::{AnimatedEncoder, AnimationOptions, EncodeJob, EncodePoll};
use crate::error::CaptureError;
use crate::frame::PixelFrame;
use crate::source::CaptureSources;
use crate::time::{Duration, HostTime};
use crate::timer::{TimerId, TimerQueue};
use crate::trace::{
    CaptureOutcome, CaptureTickEvent, EncodeProgressEvent, SessionTransitionEvent, Tracer,
};

/// Slack added to the capture period product so that binary rounding (for
/// example `0.3 × 10 = 2.9999…`) does not lose a frame.
const TARGET_EPSILON: f64 = 1e-9;

/// What the user asked to record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordingOptions {
    /// Length of the recording in seconds.
    pub duration: f64,
    /// Capture ticks per second.
    pub framerate: u32,
    /// Encoder color sampling interval, 1 (best) to 30 (fastest).
    pub quality: u8,
}

impl RecordingOptions {
    /// Two seconds at 10 fps, quality 15.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duration: 2.0,
            framerate: 10,
            quality: 15,
        }
    }

    /// Checks that the options describe a recording that can run.
    ///
    /// # Errors
    ///
    /// [`CaptureError::InvalidOptions`] naming the offending field.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(CaptureError::InvalidOptions("duration must be positive"));
        }
        if self.framerate == 0 {
            return Err(CaptureError::InvalidOptions("framerate must be at least 1"));
        }
        if !(1..=30).contains(&self.quality) {
            return Err(CaptureError::InvalidOptions(
                "quality must be between 1 and 30",
            ));
        }
        Ok(())
    }

    /// Number of frames to capture: `floor(duration × framerate)`, at
    /// least one.
    #[must_use]
    pub fn target_frames(&self) -> u32 {
        let frames = (self.duration * f64::from(self.framerate) + TARGET_EPSILON).floor();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "float-to-int casts saturate; absurd durations clamp to u32::MAX"
        )]
        let frames = frames as u32;
        frames.max(1)
    }

    /// Time between capture ticks.
    #[must_use]
    pub fn capture_period(&self) -> Duration {
        Duration(1_000_000 / u64::from(self.framerate.max(1)))
    }
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Recording limits that do not come from the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordingConfig {
    /// Longest side of a captured frame after downscaling.
    pub max_dimension: u32,
    /// Extra time past the duration before the timeout forces completion.
    pub timeout_margin: Duration,
}

impl RecordingConfig {
    /// 600 px frames, 500 ms timeout margin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_dimension: 600,
            timeout_margin: Duration::from_millis(500),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle state of a [`RecordingSession`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Capture ticks are running.
    Recording,
    /// Frames were handed to the encoder.
    Encoding,
}

/// Which session timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionTimer {
    /// The repeating capture tick.
    CaptureTick,
    /// The absolute duration timeout.
    Timeout,
}

/// Stateful controller for one recording at a time.
#[derive(Default)]
pub struct RecordingSession {
    config: RecordingConfig,
    state: SessionState,
    options: RecordingOptions,
    target: u32,
    frames: Vec<PixelFrame>,
    capture_timer: Option<TimerId>,
    timeout_timer: Option<TimerId>,
    job: Option<Box<dyn EncodeJob>>,
    encode_progress: f32,
}

impl fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("options", &self.options)
            .field("target", &self.target)
            .field("frames", &self.frames.len())
            .field("capture_timer", &self.capture_timer)
            .field("timeout_timer", &self.timeout_timer)
            .field("job", &self.job.is_some())
            .field("encode_progress", &self.encode_progress)
            .finish()
    }
}

impl RecordingSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(config: RecordingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is recording or encoding.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle)
    }

    /// Options of the current or most recent recording.
    #[must_use]
    pub const fn options(&self) -> &RecordingOptions {
        &self.options
    }

    /// Frames the current recording aims for.
    #[must_use]
    pub const fn target(&self) -> u32 {
        self.target
    }

    /// Frames captured so far in the current recording.
    #[must_use]
    pub fn captured(&self) -> u32 {
        u32::try_from(self.frames.len()).unwrap_or(u32::MAX)
    }

    /// Bytes held by buffered frames.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.frames.iter().map(PixelFrame::byte_len).sum()
    }

    /// Encoder progress in `[0, 1]`. Zero while recording or idle.
    #[must_use]
    pub fn progress(&self) -> f32 {
        match self.state {
            SessionState::Encoding => self.encode_progress,
            SessionState::Idle | SessionState::Recording => 0.0,
        }
    }

    /// Fraction of the target captured so far, in `[0, 1]`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "ratio in [0, 1] fits f32")]
    pub fn capture_progress(&self) -> f32 {
        if self.target == 0 {
            return 0.0;
        }
        (f64::from(self.captured()) / f64::from(self.target)).min(1.0) as f32
    }

    /// Starts recording at `now`.
    ///
    /// The first capture tick fires one period after `now`; the timeout
    /// fires at `now + duration + timeout_margin`.
    ///
    /// # Errors
    ///
    /// [`CaptureError::InvalidOptions`] for bad options, or
    /// [`CaptureError::SessionActive`] if a recording is already recording or
    /// encoding. Neither touches the running session.
    pub fn start<E: Clone + From<SessionTimer>>(
        &mut self,
        options: RecordingOptions,
        now: HostTime,
        timers: &mut TimerQueue<E>,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), CaptureError> {
        options.validate()?;
        if self.is_active() {
            return Err(CaptureError::SessionActive);
        }

        self.options = options;
        self.target = options.target_frames();
        self.frames = Vec::with_capacity(self.target.min(1_024) as usize);
        self.encode_progress = 0.0;

        let period = options.capture_period();
        let timeout =
            Duration::from_secs_f64(options.duration).saturating_add(self.config.timeout_margin);
        self.capture_timer = Some(timers.schedule_interval(
            now + period,
            period,
            E::from(SessionTimer::CaptureTick),
        ));
        self.timeout_timer =
            Some(timers.schedule_once(now + timeout, E::from(SessionTimer::Timeout)));
        self.transition(SessionState::Recording, now, tracer);
        Ok(())
    }

    /// Handles a capture tick that fired for deadline `at`.
    ///
    /// Captures, downscales and queues one frame, or finalizes once the
    /// target is reached. A surface that cannot be read skips this frame
    /// only. Ticks from released timers are ignored.
    ///
    /// # Errors
    ///
    /// Whatever [`finalize`](Self::finalize) reports when this tick ends the
    /// recording.
    pub fn on_capture_tick<E: Clone>(
        &mut self,
        fired: TimerId,
        at: HostTime,
        timers: &mut TimerQueue<E>,
        sources: &CaptureSources,
        encoder: &dyn AnimatedEncoder,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), CaptureError> {
        if self.state != SessionState::Recording || self.capture_timer != Some(fired) {
            return Ok(());
        }
        if self.captured() >= self.target {
            return self.finalize(at, timers, encoder, tracer);
        }

        let outcome = match sources.capture() {
            Ok(frame) => {
                self.frames
                    .push(frame.downscale_to_fit(self.config.max_dimension));
                CaptureOutcome::Captured
            }
            Err(_) => CaptureOutcome::Dropped,
        };
        tracer.capture_tick(&CaptureTickEvent {
            now: at,
            outcome,
            captured: self.captured(),
            target: self.target,
        });
        Ok(())
    }

    /// Handles the duration timeout. Ignored unless it is this recording's
    /// timeout and the session is still recording.
    ///
    /// # Errors
    ///
    /// Whatever [`finalize`](Self::finalize) reports.
    pub fn on_timeout<E: Clone>(
        &mut self,
        fired: TimerId,
        at: HostTime,
        timers: &mut TimerQueue<E>,
        encoder: &dyn AnimatedEncoder,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), CaptureError> {
        if self.state != SessionState::Recording || self.timeout_timer != Some(fired) {
            return Ok(());
        }
        self.finalize(at, timers, encoder, tracer)
    }

    /// Stops capturing and hands the frames to `encoder`.
    ///
    /// Does nothing unless the session is recording, so it is safe to reach
    /// from both the capture tick and the timeout.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoFramesCaptured`] without calling the encoder if no
    /// frame was captured, or [`CaptureError::Encode`] if the encoder refused
    /// to start. The session is idle afterwards in both cases.
    pub fn finalize<E: Clone>(
        &mut self,
        now: HostTime,
        timers: &mut TimerQueue<E>,
        encoder: &dyn AnimatedEncoder,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), CaptureError> {
        if self.state != SessionState::Recording {
            return Ok(());
        }
        self.release_timers(timers);

        if self.frames.is_empty() {
            self.teardown(timers, now, tracer);
            return Err(CaptureError::NoFramesCaptured);
        }

        let frames = core::mem::take(&mut self.frames);
        let options = AnimationOptions {
            frame_delay: self.options.capture_period(),
            sample_interval: self.options.quality,
        };
        match encoder.begin(frames, &options) {
            Ok(job) => {
                self.job = Some(job);
                self.encode_progress = 0.0;
                self.transition(SessionState::Encoding, now, tracer);
                Ok(())
            }
            Err(err) => {
                self.teardown(timers, now, tracer);
                Err(err.into())
            }
        }
    }

    /// Cancels a recording or encode in progress.
    ///
    /// Buffered frames are released and no result will be produced. Returns
    /// `false` if the session was idle.
    pub fn cancel<E: Clone>(
        &mut self,
        now: HostTime,
        timers: &mut TimerQueue<E>,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Some(mut job) = self.job.take() {
            job.cancel();
        }
        self.teardown(timers, now, tracer);
        true
    }

    /// Drives the encode job.
    ///
    /// Returns the encoded bytes or the failure exactly once, after which
    /// the session is idle. Returns `None` while the job runs or when
    /// nothing is encoding.
    pub fn poll<E: Clone>(
        &mut self,
        now: HostTime,
        timers: &mut TimerQueue<E>,
        tracer: &mut Tracer<'_>,
    ) -> Option<Result<Vec<u8>, CaptureError>> {
        let job = self.job.as_mut()?;
        match job.poll() {
            EncodePoll::Progress(progress) => {
                self.encode_progress = progress.clamp(0.0, 1.0);
                tracer.encode_progress(&EncodeProgressEvent {
                    progress: self.encode_progress,
                });
                None
            }
            EncodePoll::Finished(result) => {
                self.job = None;
                if result.is_ok() {
                    self.encode_progress = 1.0;
                    tracer.encode_progress(&EncodeProgressEvent { progress: 1.0 });
                }
                self.teardown(timers, now, tracer);
                Some(result.map_err(CaptureError::from))
            }
        }
    }

    fn release_timers<E: Clone>(&mut self, timers: &mut TimerQueue<E>) {
        if let Some(id) = self.capture_timer.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.timeout_timer.take() {
            timers.cancel(id);
        }
    }

    fn teardown<E: Clone>(
        &mut self,
        timers: &mut TimerQueue<E>,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        self.release_timers(timers);
        self.frames = Vec::new();
        self.job = None;
        self.encode_progress = 0.0;
        self.transition(SessionState::Idle, now, tracer);
    }

    fn transition(&mut self, to: SessionState, now: HostTime, tracer: &mut Tracer<'_>) {
        let from = core::mem::replace(&mut self.state, to);
        if from != to {
            tracer.session_transition(&SessionTransitionEvent { from, to, now });
        }
    }
}
