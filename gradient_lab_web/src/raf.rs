// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-refresh clock source for the browser host.
//!
//! [`RafLoop`] forwards every `requestAnimationFrame` callback to the
//! playground as a [`FrameTick`], stamped with the callback's
//! [`DOMHighResTimeStamp`][mdn]. Dropping the loop cancels the outstanding
//! request and releases the JS closure, so no callback outlives its owner.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use gradient_lab_core::clock::FrameTick;
use gradient_lab_core::time::HostTime;

// Global bindings; the per-frame path never looks up `window`.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type FrameClosure = Closure<dyn FnMut(f64)>;

/// Drives a callback once per display refresh.
///
/// Nothing is requested until [`start`](Self::start). [`stop`](Self::stop)
/// pauses the loop; `start` resumes it with the frame counter intact.
pub struct RafLoop {
    state: Rc<LoopState>,
}

struct LoopState {
    on_tick: RefCell<Box<dyn FnMut(FrameTick)>>,
    /// Re-submitted after every tick while running. Kept apart from
    /// `on_tick` so the tick handler can hold its borrow while rescheduling.
    closure: RefCell<Option<FrameClosure>>,
    /// Handle of the outstanding request, if any.
    pending: Cell<Option<i32>>,
    ticks: Cell<u64>,
    running: Cell<bool>,
}

impl LoopState {
    fn request_next(&self) {
        if let Some(closure) = self.closure.borrow().as_ref() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.pending.set(Some(id));
        }
    }

    fn cancel_pending(&self) {
        if let Some(id) = self.pending.take() {
            cancel_animation_frame(id);
        }
    }

    fn on_frame(&self, timestamp_ms: f64) {
        self.pending.set(None);
        if !self.running.get() {
            return;
        }
        let index = self.ticks.get();
        self.ticks.set(index + 1);
        (self.on_tick.borrow_mut())(frame_tick(index, timestamp_ms));

        // The handler may have stopped the loop.
        if self.running.get() {
            self.request_next();
        }
    }
}

/// Builds the tick for the `index`-th callback at `timestamp_ms`.
fn frame_tick(index: u64, timestamp_ms: f64) -> FrameTick {
    FrameTick {
        now: HostTime::from_millis_f64(timestamp_ms),
        frame_index: index,
    }
}

impl RafLoop {
    /// Creates a stopped loop that will hand each tick to `on_tick`.
    pub fn new(on_tick: impl FnMut(FrameTick) + 'static) -> Self {
        Self {
            state: Rc::new(LoopState {
                on_tick: RefCell::new(Box::new(on_tick)),
                closure: RefCell::new(None),
                pending: Cell::new(None),
                ticks: Cell::new(0),
                running: Cell::new(false),
            }),
        }
    }

    /// Requests the next frame. No-op while running.
    pub fn start(&self) {
        if self.state.running.replace(true) {
            return;
        }
        if self.state.closure.borrow().is_none() {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(
                Box::new(move |ts: f64| state.on_frame(ts)) as Box<dyn FnMut(f64)>
            );
            *self.state.closure.borrow_mut() = Some(closure);
        }
        self.state.request_next();
    }

    /// Pauses the loop, cancelling the outstanding request.
    pub fn stop(&self) {
        self.state.running.set(false);
        self.state.cancel_pending();
    }

    /// Whether ticks are being delivered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Number of ticks delivered so far.
    #[must_use]
    pub fn frames_delivered(&self) -> u64 {
        self.state.ticks.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // The closure holds an `Rc` to the state; dropping it breaks the cycle.
        self.state.closure.borrow_mut().take();
    }
}

impl fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.state.running.get())
            .field("ticks", &self.state.ticks.get())
            .field("pending", &self.state.pending.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_carries_index_and_microsecond_time() {
        let tick = frame_tick(7, 16.5);
        assert_eq!(tick.frame_index, 7, "index passes through");
        assert_eq!(tick.now, HostTime(16_500), "ms timestamp becomes µs");
    }
}
