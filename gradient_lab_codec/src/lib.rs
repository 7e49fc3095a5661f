// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoders and delivery for native hosts.
//!
//! This crate implements the encoder and sink seams of
//! [`gradient_lab_core`] with the `image` crate:
//!
//! - [`PngStillEncoder`]: lossless RGBA8 PNG for snapshots.
//! - [`GifAnimator`]: looping GIF for recordings, either encoded a frame at a
//!   time on the caller's thread ([`EncodeMode::Inline`]) or on a background
//!   thread that reports progress over a channel ([`EncodeMode::Threaded`]).
//! - [`DirectorySink`]: writes finished assets into a directory.

mod animated;
mod sink;
mod still;

pub use animated::{EncodeMode, GifAnimator};
pub use sink::DirectorySink;
pub use still::PngStillEncoder;
