// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot still-image export.
//!
//! An export is requested, waits a short settle delay so any in-flight
//! render lands, then reads the active surface and encodes it losslessly.
//! The exporter only tracks the in-flight flag and the settle timer; naming
//! and delivery belong to the controller.

use alloc::vec::Vec;

use crate::encode::StillEncoder;
use crate::error::CaptureError;
use crate::source::CaptureSources;
use crate::time::{Duration, HostTime};
use crate::timer::{TimerId, TimerQueue};

/// Upper bound on the settle delay. An export never waits longer than this
/// before reading the surface.
pub const MAX_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Snapshot export configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportConfig {
    /// Wait between the request and the read-back. Clamped to
    /// [`MAX_SETTLE_DELAY`].
    pub settle_delay: Duration,
}

impl ExportConfig {
    /// Default settle delay of 100 ms.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
        }
    }

    /// Export immediately on the next `advance`.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
        }
    }

    /// The delay actually used.
    #[must_use]
    pub const fn effective_settle_delay(&self) -> Duration {
        self.settle_delay.min(MAX_SETTLE_DELAY)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the single in-flight snapshot export.
#[derive(Clone, Debug, Default)]
pub struct SnapshotExporter {
    config: ExportConfig,
    pending: Option<TimerId>,
}

impl SnapshotExporter {
    /// Creates an idle exporter.
    #[must_use]
    pub const fn new(config: ExportConfig) -> Self {
        Self {
            config,
            pending: None,
        }
    }

    /// The exporter configuration.
    #[must_use]
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Whether an export is between request and completion.
    #[must_use]
    pub const fn is_exporting(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts an export, scheduling `event` after the settle delay.
    ///
    /// # Errors
    ///
    /// [`CaptureError::ExportInProgress`] if an export is already pending.
    pub fn request<E: Clone>(
        &mut self,
        now: HostTime,
        timers: &mut TimerQueue<E>,
        event: E,
    ) -> Result<TimerId, CaptureError> {
        if self.pending.is_some() {
            return Err(CaptureError::ExportInProgress);
        }
        let id = timers.schedule_once(now + self.config.effective_settle_delay(), event);
        self.pending = Some(id);
        Ok(id)
    }

    /// Completes the export whose settle timer `fired`.
    ///
    /// Returns `None` when `fired` is not the pending export's timer. The
    /// in-flight flag is cleared on every other path, success or failure.
    pub fn complete(
        &mut self,
        fired: TimerId,
        sources: &CaptureSources,
        encoder: &dyn StillEncoder,
    ) -> Option<Result<Vec<u8>, CaptureError>> {
        if self.pending != Some(fired) {
            return None;
        }
        self.pending = None;
        Some(
            sources
                .capture()
                .and_then(|frame| encoder.encode_png(&frame).map_err(CaptureError::from)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;
    use crate::frame::PixelFrame;
    use alloc::boxed::Box;
    use alloc::vec;

    struct SizeEncoder;

    impl StillEncoder for SizeEncoder {
        fn encode_png(&self, frame: &PixelFrame) -> Result<Vec<u8>, EncodeError> {
            Ok(vec![frame.width() as u8, frame.height() as u8])
        }
    }

    struct FailingEncoder;

    impl StillEncoder for FailingEncoder {
        fn encode_png(&self, _: &PixelFrame) -> Result<Vec<u8>, EncodeError> {
            Err(EncodeError::Codec("disk on fire".into()))
        }
    }

    fn attached() -> CaptureSources {
        let mut sources = CaptureSources::new();
        sources.attach(Box::new(|| Some(PixelFrame::filled(3, 2, [9; 4]))));
        sources
    }

    #[test]
    fn settle_delay_is_capped() {
        let config = ExportConfig {
            settle_delay: Duration::from_millis(5_000),
        };
        assert_eq!(config.effective_settle_delay(), MAX_SETTLE_DELAY);
        assert_eq!(
            ExportConfig::new().effective_settle_delay(),
            Duration::from_millis(100),
            "default is under the cap"
        );
    }

    #[test]
    fn request_complete_round_trip() {
        let mut timers = TimerQueue::new();
        let mut exporter = SnapshotExporter::new(ExportConfig::new());
        let id = exporter
            .request(HostTime(0), &mut timers, ())
            .expect("idle exporter");
        assert!(exporter.is_exporting(), "flag set on request");
        assert_eq!(timers.next_deadline(), Some(HostTime(100_000)));

        assert_eq!(
            exporter.request(HostTime(10), &mut timers, ()),
            Err(CaptureError::ExportInProgress),
            "second request rejected"
        );

        let (fired, _, ()) = timers.pop_due(HostTime(100_000)).expect("due");
        assert_eq!(fired, id);
        let bytes = exporter
            .complete(fired, &attached(), &SizeEncoder)
            .expect("pending timer")
            .expect("source present");
        assert_eq!(bytes, [3, 2], "full-size frame encoded");
        assert!(!exporter.is_exporting(), "flag cleared on success");
    }

    #[test]
    fn failures_clear_the_flag() {
        let mut timers = TimerQueue::new();
        let mut exporter = SnapshotExporter::new(ExportConfig::immediate());

        let id = exporter.request(HostTime(0), &mut timers, ()).expect("idle");
        let result = exporter.complete(id, &CaptureSources::new(), &SizeEncoder);
        assert_eq!(result, Some(Err(CaptureError::SourceUnavailable)));
        assert!(!exporter.is_exporting(), "flag cleared on missing source");

        let id = exporter.request(HostTime(0), &mut timers, ()).expect("idle");
        let result = exporter.complete(id, &attached(), &FailingEncoder);
        assert!(
            matches!(result, Some(Err(CaptureError::Encode(EncodeError::Codec(_))))),
            "{result:?}"
        );
        assert!(!exporter.is_exporting(), "flag cleared on encode failure");
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut timers = TimerQueue::new();
        let mut exporter = SnapshotExporter::new(ExportConfig::new());
        let id = exporter.request(HostTime(0), &mut timers, ()).expect("idle");
        let other = timers.schedule_once(HostTime(0), ());
        assert!(
            exporter.complete(other, &attached(), &SizeEncoder).is_none(),
            "foreign timer does not complete the export"
        );
        assert!(exporter.is_exporting(), "still pending");
        assert!(
            exporter.complete(id, &attached(), &SizeEncoder).is_some(),
            "own timer completes it"
        );
        assert!(
            exporter.complete(id, &attached(), &SizeEncoder).is_none(),
            "second firing is a no-op"
        );
    }
}
