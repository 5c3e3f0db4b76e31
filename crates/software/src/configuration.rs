//! This module contains user-configurable settings (implemented as enums and small structs) along with the [`Config`]
//! that groups the ones a [`Runtime`](crate::runtime::Runtime) needs at start-up.

mod bus_role;
pub use bus_role::*;

mod poll_intervals;
pub use poll_intervals::*;

mod txo_mode;
pub use txo_mode::*;

/// Settings consumed when constructing a [`Runtime`](crate::runtime::Runtime).
///
/// Per-module pin tables and output counts are not part of this struct; they are properties of the
/// [`CvGateOutputs`](crate::io::CvGateOutputs) implementation for the hardware at hand.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Config {
    /// How often each periodic subsystem is polled.
    pub poll_intervals: PollIntervals,
}
