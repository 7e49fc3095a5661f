// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` wake-ups.
//!
//! Browsers throttle `requestAnimationFrame` in hidden tabs, but recording
//! ticks and the snapshot settle delay still need to fire. A [`WakeTimer`]
//! is armed for the playground's next deadline and calls back when it
//! passes; the callback is expected to call `advance` and re-arm.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use gradient_lab_core::time::HostTime;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

/// A re-armable one-shot `setTimeout`. Disarmed when dropped.
pub struct WakeTimer {
    inner: Rc<WakeInner>,
}

struct WakeInner {
    closure: RefCell<Option<Closure<dyn FnMut()>>>,
    callback: RefCell<Box<dyn FnMut()>>,
    pending: Cell<Option<i32>>,
}

impl WakeTimer {
    /// Creates a disarmed timer that runs `callback` when it fires.
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        let inner = Rc::new(WakeInner {
            closure: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
            pending: Cell::new(None),
        });
        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.pending.set(None);
                inner.callback.borrow_mut()();
            }
        }) as Box<dyn FnMut()>);
        *inner.closure.borrow_mut() = Some(closure);
        Self { inner }
    }

    /// Arms the timer for `deadline`, replacing any earlier arming. A
    /// deadline in the past fires on the next macrotask.
    pub fn arm_at(&self, deadline: HostTime) {
        self.disarm();
        let delay = deadline.saturating_duration_since(crate::now());
        // Round up so the callback never lands just before the deadline.
        let delay_ms = i32::try_from(delay.micros().div_ceil(1_000)).unwrap_or(i32::MAX);
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = set_timeout(closure.as_ref().unchecked_ref(), delay_ms);
            self.inner.pending.set(Some(id));
        }
    }

    /// Cancels a pending wake-up.
    pub fn disarm(&self) {
        if let Some(id) = self.inner.pending.take() {
            clear_timeout(id);
        }
    }

    /// Whether a wake-up is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl Drop for WakeTimer {
    fn drop(&mut self) {
        self.disarm();
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for WakeTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WakeTimer")
            .field("pending", &self.inner.pending.get())
            .finish_non_exhaustive()
    }
}
