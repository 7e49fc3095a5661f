// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs;
use std::path::{Path, PathBuf};

use gradient_lab_core::asset::{AssetSink, EncodedAsset};
use gradient_lab_core::error::CaptureError;

/// Writes each delivered asset to `<dir>/<filename>`.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Creates a sink writing into `dir`. The directory is created on first
    /// delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl AssetSink for DirectorySink {
    fn deliver(&mut self, asset: EncodedAsset) -> Result<(), CaptureError> {
        // Filenames are generated, but never let one escape the directory.
        let name = Path::new(&asset.filename)
            .file_name()
            .ok_or_else(|| CaptureError::Delivery(format!("bad filename {:?}", asset.filename)))?;
        let path = self.dir.join(name);
        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&path, &asset.bytes))
            .map_err(|e| CaptureError::Delivery(format!("{}: {e}", path.display())))?;
        self.written.push(path);
        Ok(())
    }
}
