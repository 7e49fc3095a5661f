// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser downloads.

use alloc::format;

use gradient_lab_core::asset::{AssetSink, EncodedAsset};
use gradient_lab_core::error::CaptureError;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Delivers assets by clicking a temporary `<a download>` link pointing at
/// an object URL. The URL is revoked right after the click.
#[derive(Clone, Copy, Debug, Default)]
pub struct DownloadSink;

fn js_err(err: JsValue) -> CaptureError {
    CaptureError::Delivery(format!("{err:?}"))
}

impl AssetSink for DownloadSink {
    fn deliver(&mut self, asset: EncodedAsset) -> Result<(), CaptureError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| CaptureError::Delivery("no document".into()))?;

        let bytes = Uint8Array::from(asset.bytes.as_slice());
        let options = BlobPropertyBag::new();
        options.set_type(asset.kind.mime_type());
        let blob = Blob::new_with_u8_array_sequence_and_options(&Array::of1(&bytes), &options)
            .map_err(js_err)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(js_err)?;

        let anchor = document
            .create_element("a")
            .map_err(js_err)?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| CaptureError::Delivery("anchor cast failed".into()))?;
        anchor.set_href(&url);
        anchor.set_download(&asset.filename);
        anchor.click();

        Url::revoke_object_url(&url).map_err(js_err)
    }
}
