// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace sinks for gradient lab diagnostics.
//!
//! This crate provides [`TraceSink`](gradient_lab_core::trace::TraceSink)
//! implementations for development:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`json::JsonLinesSink`]: one JSON object per line, for piping into
//!   `jq` or a log store.

pub mod json;
pub mod pretty;

use gradient_lab_core::asset::AssetKind;
use gradient_lab_core::recording::SessionState;
use gradient_lab_core::trace::CaptureOutcome;

fn kind_name(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Png => "png",
        AssetKind::Gif => "gif",
    }
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Recording => "recording",
        SessionState::Encoding => "encoding",
    }
}

fn outcome_name(outcome: CaptureOutcome) -> &'static str {
    match outcome {
        CaptureOutcome::Captured => "captured",
        CaptureOutcome::Dropped => "dropped",
    }
}
