//! Decides when each periodic subsystem is due.

use embassy_time::{Duration, Instant};

use crate::configuration::PollIntervals;

/// The periodic jobs of the run loop, in the order they are considered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Subsystem {
    /// Knob and CV input sampling.
    Adc,
    /// Button and gate input scanning.
    Inputs,
    /// Incoming MIDI.
    Midi,
    /// Attached HID devices.
    Hid,
    /// Flushing coalesced device settings.
    DeviceRefresh,
}

impl Subsystem {
    /// Every subsystem, in the order a pass considers them.
    pub const ALL: [Subsystem; 5] = [
        Self::Adc,
        Self::Inputs,
        Self::Midi,
        Self::Hid,
        Self::DeviceRefresh,
    ];
}

/// Tracks when each [`Subsystem`] last ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler {
    intervals: [Duration; Subsystem::ALL.len()],
    last_run: [Instant; Subsystem::ALL.len()],
}

impl Scheduler {
    /// Creates a scheduler in which nothing has run yet.
    pub fn new(intervals: &PollIntervals) -> Self {
        Self {
            intervals: [
                intervals.adc,
                intervals.inputs,
                intervals.midi,
                intervals.hid,
                intervals.device_refresh,
            ],
            last_run: [Instant::from_ticks(0); Subsystem::ALL.len()],
        }
    }

    /// Returns true, and marks `subsystem` as having run at `now`, if more than its interval has elapsed since it
    /// last ran.
    ///
    /// Elapsed time is computed on wrapping milliseconds, so a clock that rolls over doesn't stall the loop. Callers
    /// skip this for inactive subsystems, which therefore keep their last run time.
    pub fn take_due(&mut self, subsystem: Subsystem, now: Instant) -> bool {
        let i = subsystem as usize;
        let elapsed = now.as_millis().wrapping_sub(self.last_run[i].as_millis());
        if elapsed <= self.intervals[i].as_millis() {
            return false;
        }
        self.last_run[i] = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due(scheduler: &mut Scheduler, now: u64, active: &[Subsystem]) -> Vec<Subsystem> {
        Subsystem::ALL
            .into_iter()
            .filter(|s| active.contains(s) && scheduler.take_due(*s, Instant::from_millis(now)))
            .collect()
    }

    #[test]
    fn runs_after_the_interval_has_passed() {
        let mut scheduler = Scheduler::new(&PollIntervals::default());

        assert!(due(&mut scheduler, 8, &[Subsystem::Midi]).is_empty(), "Should wait more than 8 ms");
        assert_eq!(
            vec![Subsystem::Midi],
            due(&mut scheduler, 9, &[Subsystem::Midi]),
            "Expected left but got right"
        );
        assert!(due(&mut scheduler, 17, &[Subsystem::Midi]).is_empty(), "Should measure from the last run");
        assert_eq!(
            vec![Subsystem::Midi],
            due(&mut scheduler, 18, &[Subsystem::Midi]),
            "Expected left but got right"
        );
    }

    #[test]
    fn runs_in_order() {
        let mut scheduler = Scheduler::new(&PollIntervals::default());

        assert_eq!(
            Subsystem::ALL.to_vec(),
            due(&mut scheduler, 1000, &Subsystem::ALL),
            "Expected left but got right"
        );
    }

    #[test]
    fn inactive_subsystems_keep_their_last_run() {
        let mut scheduler = Scheduler::new(&PollIntervals::default());
        due(&mut scheduler, 200, &[Subsystem::Hid]);

        assert!(due(&mut scheduler, 230, &[Subsystem::Hid]).is_empty(), "Should not be due yet");
        assert_eq!(
            vec![Subsystem::Hid],
            due(&mut scheduler, 249, &[Subsystem::Hid]),
            "Expected left but got right"
        );
        // MIDI never ran, so it is due as soon as it becomes active
        assert_eq!(
            vec![Subsystem::Midi],
            due(&mut scheduler, 250, &[Subsystem::Midi]),
            "Expected left but got right"
        );
    }
}
