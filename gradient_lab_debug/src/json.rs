// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Machine-readable trace output.
//!
//! [`JsonLinesSink`] writes each event as one JSON object per line. Every
//! object has an `"event"` field naming the event; host times are in
//! microseconds (`"now_us"`).

use std::io::Write;

use gradient_lab_core::trace::{
    AssetDeliveredEvent, CaptureTickEvent, ClockTickEvent, EncodeProgressEvent,
    ExportFinishedEvent, SessionTransitionEvent, TraceSink, TrailAdmitEvent,
};
use serde_json::{Value, json};

use crate::{kind_name, outcome_name, state_name};

/// Writes one JSON object per trace event.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, value: &Value) {
        if serde_json::to_writer(&mut self.writer, value).is_ok() {
            let _ = self.writer.write_all(b"\n");
        }
    }
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_clock_tick(&mut self, e: &ClockTickEvent) {
        self.emit(&json!({
            "event": "clock_tick",
            "frame": e.frame_index,
            "now_us": e.now.micros(),
            "time": e.time,
        }));
    }

    fn on_trail_admit(&mut self, e: &TrailAdmitEvent) {
        self.emit(&json!({
            "event": "trail_admit",
            "x": e.position[0],
            "y": e.position[1],
            "time": e.time,
            "len": e.len,
        }));
    }

    fn on_capture_tick(&mut self, e: &CaptureTickEvent) {
        self.emit(&json!({
            "event": "capture_tick",
            "now_us": e.now.micros(),
            "outcome": outcome_name(e.outcome),
            "captured": e.captured,
            "target": e.target,
        }));
    }

    fn on_session_transition(&mut self, e: &SessionTransitionEvent) {
        self.emit(&json!({
            "event": "session_transition",
            "from": state_name(e.from),
            "to": state_name(e.to),
            "now_us": e.now.micros(),
        }));
    }

    fn on_encode_progress(&mut self, e: &EncodeProgressEvent) {
        self.emit(&json!({
            "event": "encode_progress",
            "progress": e.progress,
        }));
    }

    fn on_export_finished(&mut self, e: &ExportFinishedEvent<'_>) {
        self.emit(&json!({
            "event": "export_finished",
            "kind": kind_name(e.kind),
            "now_us": e.now.micros(),
            "error": e.error.map(ToString::to_string),
            "cancelled": e.cancelled,
        }));
    }

    fn on_asset_delivered(&mut self, e: &AssetDeliveredEvent<'_>) {
        self.emit(&json!({
            "event": "asset_delivered",
            "kind": kind_name(e.kind),
            "filename": e.filename,
            "bytes": e.bytes,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient_lab_core::asset::AssetKind;
    use gradient_lab_core::error::CaptureError;
    use gradient_lab_core::time::HostTime;
    use gradient_lab_core::trace::CaptureOutcome;

    fn lines(sink: JsonLinesSink<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_capture_tick(&CaptureTickEvent {
            now: HostTime(100_000),
            outcome: CaptureOutcome::Captured,
            captured: 1,
            target: 20,
        });
        sink.on_asset_delivered(&AssetDeliveredEvent {
            kind: AssetKind::Gif,
            filename: "gradient-animated-5.gif",
            bytes: 1234,
        });

        let parsed = lines(sink);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["event"], "capture_tick");
        assert_eq!(parsed[0]["now_us"], 100_000);
        assert_eq!(parsed[0]["outcome"], "captured");
        assert_eq!(parsed[1]["filename"], "gradient-animated-5.gif");
        assert_eq!(parsed[1]["bytes"], 1234);
    }

    #[test]
    fn export_error_is_a_string_or_null() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_export_finished(&ExportFinishedEvent {
            kind: AssetKind::Gif,
            now: HostTime(0),
            error: Some(&CaptureError::NoFramesCaptured),
            cancelled: false,
        });
        sink.on_export_finished(&ExportFinishedEvent {
            kind: AssetKind::Gif,
            now: HostTime(0),
            error: None,
            cancelled: true,
        });

        let parsed = lines(sink);
        assert_eq!(parsed[0]["error"], "recording captured no frames");
        assert!(parsed[1]["error"].is_null(), "no error on cancel");
        assert_eq!(parsed[1]["cancelled"], true);
    }
}
