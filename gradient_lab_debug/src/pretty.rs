// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! are printed in milliseconds.

use std::io::Write;

use gradient_lab_core::time::HostTime;
use gradient_lab_core::trace::{
    AssetDeliveredEvent, CaptureTickEvent, ClockTickEvent, EncodeProgressEvent,
    ExportFinishedEvent, SessionTransitionEvent, TraceSink, TrailAdmitEvent,
};

use crate::{kind_name, outcome_name, state_name};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    clock_ticks: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("clock_ticks", &self.clock_ticks)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    ///
    /// Per-refresh clock ticks are skipped unless enabled with
    /// [`with_clock_ticks`](Self::with_clock_ticks).
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            clock_ticks: false,
        }
    }

    /// Also prints one line per clock tick.
    #[must_use]
    pub fn with_clock_ticks(mut self, enabled: bool) -> Self {
        self.clock_ticks = enabled;
        self
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn host_ms(t: HostTime) -> f64 {
    t.micros() as f64 / 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_clock_tick(&mut self, e: &ClockTickEvent) {
        if !self.clock_ticks {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[tick] frame={} now={:.1}ms t={:.3}s",
            e.frame_index,
            host_ms(e.now),
            e.time,
        );
    }

    fn on_trail_admit(&mut self, e: &TrailAdmitEvent) {
        let _ = writeln!(
            self.writer,
            "[trail] ({:.3}, {:.3}) at t={:.3}s len={}",
            e.position[0], e.position[1], e.time, e.len,
        );
    }

    fn on_capture_tick(&mut self, e: &CaptureTickEvent) {
        let _ = writeln!(
            self.writer,
            "[capture] {} {}/{} at {:.1}ms",
            outcome_name(e.outcome),
            e.captured,
            e.target,
            host_ms(e.now),
        );
    }

    fn on_session_transition(&mut self, e: &SessionTransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[session] {} -> {} at {:.1}ms",
            state_name(e.from),
            state_name(e.to),
            host_ms(e.now),
        );
    }

    fn on_encode_progress(&mut self, e: &EncodeProgressEvent) {
        let _ = writeln!(self.writer, "[encode] {:.0}%", e.progress * 100.0);
    }

    fn on_export_finished(&mut self, e: &ExportFinishedEvent<'_>) {
        let outcome = match (e.error, e.cancelled) {
            (Some(err), _) => format!("FAILED: {err}"),
            (None, true) => "cancelled".to_owned(),
            (None, false) => "ok".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[export] {} {outcome} at {:.1}ms",
            kind_name(e.kind),
            host_ms(e.now),
        );
    }

    fn on_asset_delivered(&mut self, e: &AssetDeliveredEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[asset] {} {} bytes={}",
            kind_name(e.kind),
            e.filename,
            e.bytes,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient_lab_core::asset::AssetKind;
    use gradient_lab_core::error::CaptureError;
    use gradient_lab_core::recording::SessionState;
    use gradient_lab_core::trace::CaptureOutcome;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_capture_and_transition() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_capture_tick(&CaptureTickEvent {
            now: HostTime(1_500_000),
            outcome: CaptureOutcome::Dropped,
            captured: 3,
            target: 20,
        });
        sink.on_session_transition(&SessionTransitionEvent {
            from: SessionState::Recording,
            to: SessionState::Encoding,
            now: HostTime(2_100_000),
        });
        let output = output(sink);
        assert!(output.contains("[capture] dropped 3/20 at 1500.0ms"), "got: {output}");
        assert!(output.contains("recording -> encoding"), "got: {output}");
    }

    #[test]
    fn clock_ticks_are_opt_in() {
        let tick = ClockTickEvent {
            frame_index: 7,
            now: HostTime(0),
            time: 0.0,
        };
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_clock_tick(&tick);
        assert!(output(quiet).is_empty(), "ticks skipped by default");

        let mut loud = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_clock_ticks(true);
        loud.on_clock_tick(&tick);
        assert!(output(loud).contains("frame=7"));
    }

    #[test]
    fn export_failure_names_the_error() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_export_finished(&ExportFinishedEvent {
            kind: AssetKind::Png,
            now: HostTime(0),
            error: Some(&CaptureError::SourceUnavailable),
            cancelled: false,
        });
        let output = output(sink);
        assert!(output.contains("[export] png FAILED: no capturable surface"), "got: {output}");
    }
}
