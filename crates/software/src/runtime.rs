//! The cooperative run loop which drives a [`Multipass`] from polled peripherals, timers, and queued events.
//!
//! Firmware calls [`Runtime::step`] over and over from a single task, yielding in between. Each step:
//! 1. runs every [`Subsystem`] that is due,
//! 2. hands an [`Event::TimedEvent`] to the application for every timer whose deadline has passed,
//! 3. hands at most one queued event to the application.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Instant;
use embedded_hal::i2c::I2c;

use crate::configuration::Config;
use crate::events::{Event, EventQueue};
use crate::io::CvGateOutputs;
use crate::multipass::Multipass;
use crate::scheduler::{Scheduler, Subsystem};
use crate::timers::{TIMED_EVENT_COUNT, TimedEvents};

/// What an application gets to work with while handling an event.
pub struct Context<'a, I: I2c, O: CvGateOutputs> {
    /// The note dispatch engine.
    pub multipass: &'a mut Multipass<I, O>,
    timers: &'a mut TimedEvents,
    now: Instant,
}

impl<I: I2c, O: CvGateOutputs> Context<'_, I, O> {
    /// The time the current step started.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Starts timer `index`, replacing whatever it was doing. It fires `period_ms` from now, and every `period_ms`
    /// after that if `repeat` is set.
    pub fn add_timed_event(&mut self, index: usize, period_ms: u16, repeat: bool) {
        self.timers.add(index, period_ms, repeat, self.now);
    }

    /// Stops timer `index`.
    pub fn stop_timed_event(&mut self, index: usize) {
        self.timers.stop(index);
    }

    /// Changes the period of timer `index` without moving its next deadline.
    pub fn update_timer_interval(&mut self, index: usize, period_ms: u16) {
        self.timers.update_interval(index, period_ms);
    }
}

/// Application logic: decides what to play in response to what happens.
pub trait Control<I: I2c, O: CvGateOutputs> {
    /// Called once, before any event is delivered.
    fn init(&mut self, ctx: &mut Context<'_, I, O>) {
        let _ = ctx;
    }

    /// Handles one event. Never called with [`Event::Unknown`].
    fn process_event(&mut self, event: Event, ctx: &mut Context<'_, I, O>);
}

/// The module's input drivers, as seen by the run loop.
pub trait Peripherals {
    /// Returns false while a subsystem has nothing to poll (e.g. no MIDI device is attached). Inactive subsystems
    /// are skipped without resetting their schedule.
    fn is_active(&self, subsystem: Subsystem) -> bool {
        let _ = subsystem;
        true
    }

    /// Reads `subsystem`'s inputs, posting whatever happened to `events`.
    ///
    /// Never called with [`Subsystem::DeviceRefresh`], which the runtime handles itself.
    fn poll<M: RawMutex, const N: usize>(&mut self, subsystem: Subsystem, events: &EventQueue<M, N>);
}

/// Owns the engine, timers, and schedule, and reads from an [`EventQueue`] shared with drivers.
pub struct Runtime<'q, I: I2c, O: CvGateOutputs, M: RawMutex, const N: usize> {
    multipass: Multipass<I, O>,
    timers: TimedEvents,
    scheduler: Scheduler,
    events: &'q EventQueue<M, N>,
    initialized: bool,
}

impl<'q, I: I2c, O: CvGateOutputs, M: RawMutex, const N: usize> Runtime<'q, I, O, M, N> {
    /// Creates a runtime. No event is delivered until [`Runtime::initialize`] has run.
    pub fn new(multipass: Multipass<I, O>, config: &Config, events: &'q EventQueue<M, N>) -> Self {
        Self {
            multipass,
            timers: TimedEvents::default(),
            scheduler: Scheduler::new(&config.poll_intervals),
            events,
            initialized: false,
        }
    }

    /// Lets `control` set itself up, then starts delivering events to it.
    pub fn initialize(&mut self, now: Instant, control: &mut impl Control<I, O>) {
        let mut ctx = Context {
            multipass: &mut self.multipass,
            timers: &mut self.timers,
            now,
        };
        control.init(&mut ctx);
        self.initialized = true;
        info!("Runtime initialized");
    }

    /// Runs one iteration of the loop at time `now`.
    pub fn step(&mut self, now: Instant, control: &mut impl Control<I, O>, peripherals: &mut impl Peripherals) {
        for subsystem in Subsystem::ALL {
            if !peripherals.is_active(subsystem) || !self.scheduler.take_due(subsystem, now) {
                continue;
            }
            match subsystem {
                Subsystem::DeviceRefresh => self.multipass.refresh_devices(),
                _ => peripherals.poll(subsystem, self.events),
            }
        }

        let mut fired = [false; TIMED_EVENT_COUNT];
        self.timers.poll(now, |index| fired[usize::from(index)] = true);
        for index in (0..TIMED_EVENT_COUNT).filter(|&index| fired[index]) {
            self.deliver(Event::TimedEvent { index: index as u8 }, now, control);
        }

        if let Some(event) = self.events.next() {
            self.deliver(event, now, control);
        }
    }

    fn deliver(&mut self, event: Event, now: Instant, control: &mut impl Control<I, O>) {
        if !self.initialized {
            debug!("Dropping {} received before initialization", event);
            return;
        }
        if let Event::Unknown { tag } = event {
            debug!("Dropping event with unknown tag {=u8:#x}", tag);
            return;
        }
        let mut ctx = Context {
            multipass: &mut self.multipass,
            timers: &mut self.timers,
            now,
        };
        control.process_event(event, &mut ctx);
    }

    /// The engine.
    pub fn multipass(&self) -> &Multipass<I, O> {
        &self.multipass
    }

    /// The engine, mutably.
    pub fn multipass_mut(&mut self) -> &mut Multipass<I, O> {
        &mut self.multipass
    }
}
