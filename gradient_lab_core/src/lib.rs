// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Temporal interaction core for a procedural gradient playground.
//!
//! `gradient_lab_core` keeps the state that sits between a continuously
//! animating rendering surface and the user: the animation clock, a bounded
//! pointer trail that drives expanding ripples, and a capture pipeline for
//! still snapshots and timed animated recordings. It is `no_std` compatible
//! (with `alloc`) and performs no I/O; hosts supply ticks, pointer events,
//! surfaces, encoders and an asset sink.
//!
//! # Architecture
//!
//! ```text
//!   Host (refresh tick, pointer events)
//!       │
//!       ▼
//!   FrameTick ──► AnimationClock ──► TrailBuffer::snapshot() ──► GradientUniforms
//!                                                                     │
//!                                                      rendering surface
//!                                                                     │
//!   CaptureSources ◄──────────────────────────────── FrameSource ◄────┘
//!       │
//!       ├──► SnapshotExporter ──► StillEncoder ──────────┐
//!       │                                                ▼
//!       └──► RecordingSession ──► AnimatedEncoder ──► AssetSink
//! ```
//!
//! **[`clock`]**: zero-based, monotonic simulation time from host ticks.
//!
//! **[`trail`]**: fixed-capacity pointer history with OR-combined time and
//! distance admission, exported as sentinel-padded arrays.
//!
//! **[`ripple`]**: the expanding-ring contribution model the rendering
//! surface evaluates over a trail snapshot.
//!
//! **[`uniforms`]**: per-frame parameter block, with [`color`] conversions.
//!
//! **[`source`]**: explicitly attached capturable surfaces; the most recent
//! one wins.
//!
//! **[`export`]** and **[`recording`]**: the snapshot exporter and the
//! recording state machine, both scheduled on a virtual [`timer`] queue.
//!
//! **[`encode`]** and **[`asset`]**: encoder and delivery seams.
//!
//! **[`playground`]**: the controller that wires all of the above to a host.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod asset;
pub mod clock;
pub mod color;
pub mod encode;
pub mod error;
pub mod export;
pub mod frame;
pub mod playground;
pub mod pointer;
pub mod recording;
pub mod ripple;
pub mod source;
pub mod time;
pub mod timer;
pub mod trace;
pub mod trail;
pub mod uniforms;

pub use error::{CaptureError, EncodeError};
pub use playground::{Playground, PlaygroundConfig, PlaygroundStatus};
