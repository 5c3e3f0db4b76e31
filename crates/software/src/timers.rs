//! Application-defined timers, identified by slot index, which fire as [`Event::TimedEvent`](crate::events::Event).

use embassy_time::{Duration, Instant};

/// The number of timer slots.
pub const TIMED_EVENT_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    deadline: Instant,
    period: Duration,
    repeat: bool,
}

/// A fixed set of one-shot or repeating timers.
///
/// Nothing here reads a clock; callers pass the current time in, which keeps firing deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvents {
    slots: [Option<Timer>; TIMED_EVENT_COUNT],
}

impl Default for TimedEvents {
    fn default() -> Self {
        Self {
            slots: [None; TIMED_EVENT_COUNT],
        }
    }
}

impl TimedEvents {
    /// Starts timer `index`, first firing `period_ms` after `now`. Whatever the slot held before is discarded.
    pub fn add(&mut self, index: usize, period_ms: u16, repeat: bool, now: Instant) {
        let Some(slot) = self.slots.get_mut(index) else {
            debug!("no timer {}", index);
            return;
        };
        let period = Duration::from_millis(u64::from(period_ms));
        *slot = Some(Timer {
            deadline: now + period,
            period,
            repeat,
        });
    }

    /// Stops timer `index`. Stopping an idle timer does nothing.
    pub fn stop(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
    }

    /// Changes the period of timer `index` without moving its next deadline.
    pub fn update_interval(&mut self, index: usize, period_ms: u16) {
        if let Some(Some(timer)) = self.slots.get_mut(index) {
            timer.period = Duration::from_millis(u64::from(period_ms));
        }
    }

    /// Returns true if timer `index` is running.
    pub fn is_active(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Calls `fire` with the index of every timer whose deadline has passed.
    ///
    /// One-shot timers stop after firing. Repeating timers move their deadline forward by one period, so a timer
    /// which has fallen several periods behind fires once per poll until it catches up.
    pub fn poll(&mut self, now: Instant, mut fire: impl FnMut(u8)) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(timer) = slot else {
                continue;
            };
            if now < timer.deadline {
                continue;
            }
            if timer.repeat {
                timer.deadline += timer.period;
            } else {
                *slot = None;
            }
            fire(index as u8);
        }
    }
}
