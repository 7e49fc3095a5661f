// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for capture, encoding and delivery.

use alloc::string::String;
use core::fmt;

/// Failure reported by an image or animation encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// The encoder was handed no frames.
    EmptyInput,
    /// A frame's dimensions differ from the first frame's.
    MismatchedFrame {
        /// Index of the offending frame.
        index: usize,
    },
    /// The underlying codec rejected the input.
    Codec(String),
    /// The job was cancelled before it finished.
    Cancelled,
    /// A background worker went away without reporting a result.
    WorkerLost,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => f.write_str("no frames to encode"),
            Self::MismatchedFrame { index } => {
                write!(f, "frame {index} does not match the first frame's size")
            }
            Self::Codec(msg) => write!(f, "codec error: {msg}"),
            Self::Cancelled => f.write_str("encoding cancelled"),
            Self::WorkerLost => f.write_str("encoder worker exited without a result"),
        }
    }
}

impl core::error::Error for EncodeError {}

/// Failure of a snapshot export or an animated recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureError {
    /// No rendering surface is attached, or it failed to produce pixels.
    SourceUnavailable,
    /// A recording finished without a single captured frame.
    NoFramesCaptured,
    /// Encoding the captured pixels failed.
    Encode(EncodeError),
    /// A recording session is already recording or encoding.
    SessionActive,
    /// A snapshot export is already in flight.
    ExportInProgress,
    /// Recording options were out of range.
    InvalidOptions(&'static str),
    /// The host refused or failed to deliver the finished asset.
    Delivery(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable => f.write_str("no capturable surface is available"),
            Self::NoFramesCaptured => f.write_str("recording captured no frames"),
            Self::Encode(err) => write!(f, "encoding failed: {err}"),
            Self::SessionActive => f.write_str("a recording session is already active"),
            Self::ExportInProgress => f.write_str("a snapshot export is already in progress"),
            Self::InvalidOptions(why) => write!(f, "invalid recording options: {why}"),
            Self::Delivery(msg) => write!(f, "asset delivery failed: {msg}"),
        }
    }
}

impl core::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EncodeError> for CaptureError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use core::error::Error as _;

    #[test]
    fn encode_error_is_the_source() {
        let err = CaptureError::from(EncodeError::EmptyInput);
        assert_eq!(err.to_string(), "encoding failed: no frames to encode");
        assert!(err.source().is_some(), "encode errors chain");
        assert!(CaptureError::NoFramesCaptured.source().is_none());
    }

    #[test]
    fn invalid_options_names_the_field() {
        let err = CaptureError::InvalidOptions("framerate must be between 1 and 60");
        assert!(err.to_string().contains("framerate"), "{err}");
    }
}
