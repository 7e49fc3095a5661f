// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Finished assets and their delivery.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::error::CaptureError;
use crate::time::HostTime;

/// Container format of an [`EncodedAsset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Lossless still image.
    Png,
    /// Looping animated image.
    Gif,
}

impl AssetKind {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    /// MIME type for download hosts.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    const fn stem(self) -> &'static str {
        match self {
            Self::Png => "gradient",
            Self::Gif => "gradient-animated",
        }
    }
}

/// Encoded bytes plus the filename suggested to the user.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    /// Container format.
    pub kind: AssetKind,
    /// Suggested filename, including extension.
    pub filename: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for EncodedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedAsset")
            .field("kind", &self.kind)
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Filename for an asset captured at `stamp_ms` (Unix milliseconds).
#[must_use]
pub fn asset_filename(kind: AssetKind, stamp_ms: u64) -> String {
    format!("{}-{stamp_ms}.{}", kind.stem(), kind.extension())
}

/// Receives finished assets. Ownership of the bytes moves to the sink.
pub trait AssetSink {
    /// Hands `asset` to the user (download, file write, ...).
    ///
    /// # Errors
    ///
    /// [`CaptureError::Delivery`] if the host could not deliver it.
    fn deliver(&mut self, asset: EncodedAsset) -> Result<(), CaptureError>;
}

/// Sink that keeps every delivered asset in memory.
///
/// Clones share storage, so a host can keep one handle and give another to
/// the controller.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    assets: Rc<RefCell<Vec<EncodedAsset>>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assets delivered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.borrow().len()
    }

    /// Whether nothing has been delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.borrow().is_empty()
    }

    /// Removes and returns every delivered asset, oldest first.
    pub fn take(&self) -> Vec<EncodedAsset> {
        core::mem::take(&mut *self.assets.borrow_mut())
    }
}

impl AssetSink for CollectingSink {
    fn deliver(&mut self, asset: EncodedAsset) -> Result<(), CaptureError> {
        self.assets.borrow_mut().push(asset);
        Ok(())
    }
}

/// Maps host time to wall-clock filename stamps.
///
/// Stamps are `origin_unix_ms` plus the host time in milliseconds, bumped
/// forward when needed so two assets never share a stamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilenameClock {
    origin_unix_ms: u64,
    last: Option<u64>,
}

impl FilenameClock {
    /// Creates a clock whose host-time zero corresponds to `origin_unix_ms`.
    #[must_use]
    pub const fn new(origin_unix_ms: u64) -> Self {
        Self {
            origin_unix_ms,
            last: None,
        }
    }

    /// Returns a fresh stamp for an asset finished at `now`.
    pub fn stamp(&mut self, now: HostTime) -> u64 {
        let mut stamp = self.origin_unix_ms.saturating_add(now.as_millis());
        if let Some(last) = self.last {
            if stamp <= last {
                stamp = last.saturating_add(1);
            }
        }
        self.last = Some(stamp);
        stamp
    }

    /// Returns a fresh filename for an asset finished at `now`.
    pub fn filename(&mut self, kind: AssetKind, now: HostTime) -> String {
        asset_filename(kind, self.stamp(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_follow_the_download_pattern() {
        assert_eq!(
            asset_filename(AssetKind::Png, 1_700_000_000_123),
            "gradient-1700000000123.png"
        );
        assert_eq!(
            asset_filename(AssetKind::Gif, 42),
            "gradient-animated-42.gif",
            "animated assets get their own stem"
        );
    }

    #[test]
    fn filename_clock_never_repeats() {
        let mut clock = FilenameClock::new(1_000);
        assert_eq!(clock.stamp(HostTime(5_000)), 1_005);
        assert_eq!(clock.stamp(HostTime(5_400)), 1_006, "same millisecond bumps");
        assert_eq!(clock.stamp(HostTime(2_000)), 1_007, "earlier time bumps");
        assert_eq!(clock.stamp(HostTime(10_000)), 1_010, "later time passes through");
    }

    #[test]
    fn collecting_sink_shares_storage() {
        let sink = CollectingSink::new();
        let mut handle = sink.clone();
        handle
            .deliver(EncodedAsset {
                kind: AssetKind::Png,
                filename: asset_filename(AssetKind::Png, 1),
                bytes: Vec::from([1_u8, 2, 3]),
            })
            .expect("collecting never fails");
        assert_eq!(sink.len(), 1, "visible through the original handle");
        let taken = sink.take();
        assert_eq!(taken[0].filename, "gradient-1.png");
        assert!(sink.is_empty(), "take drains");
    }
}
