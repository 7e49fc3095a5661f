// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned, explicitly cancellable timers on a virtual time line.
//!
//! Nothing here sleeps. The host asks for [`TimerQueue::next_deadline`],
//! arranges to be woken then, and drains due events with
//! [`TimerQueue::pop_due`]. Events are popped one at a time so that handling
//! one event may cancel others before they fire.

use alloc::vec::Vec;

use crate::time::{Duration, HostTime};

/// Handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<E> {
    id: TimerId,
    deadline: HostTime,
    period: Option<Duration>,
    event: E,
}

/// A set of one-shot and repeating timers.
///
/// Due entries fire in `(deadline, id)` order. A repeating timer re-arms at
/// `deadline + period` rather than at the time it was popped, so a large
/// jump in time replays every missed tick in order.
#[derive(Clone, Debug)]
pub struct TimerQueue<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E: Clone> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> TimerQueue<E> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    fn alloc_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fires `event` once at `at`.
    pub fn schedule_once(&mut self, at: HostTime, event: E) -> TimerId {
        let id = self.alloc_id();
        self.entries.push(Entry {
            id,
            deadline: at,
            period: None,
            event,
        });
        id
    }

    /// Fires `event` at `first` and every `period` after that until
    /// cancelled. A zero period is treated as one microsecond.
    pub fn schedule_interval(&mut self, first: HostTime, period: Duration, event: E) -> TimerId {
        let id = self.alloc_id();
        let period = if period == Duration::ZERO {
            Duration(1)
        } else {
            period
        };
        self.entries.push(Entry {
            id,
            deadline: first,
            period: Some(period),
            event,
        });
        id
    }

    /// Cancels a timer. Returns `false` if it already fired (one-shot) or
    /// was cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Whether `id` is still scheduled.
    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pops the earliest timer due at or before `now`.
    ///
    /// Returns the deadline it was scheduled for, which may be earlier than
    /// `now`.
    pub fn pop_due(&mut self, now: HostTime) -> Option<(TimerId, HostTime, E)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.id))
            .map(|(index, _)| index)?;

        let entry = &mut self.entries[index];
        let fired = (entry.id, entry.deadline, entry.event.clone());
        match entry.period {
            Some(period) => entry.deadline = entry.deadline + period,
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(fired)
    }
}
