//! This crate contains architecture-agnostic logic for Multipass, a hardware abstraction layer which lets eurorack
//! control modules play notes on "voices" without knowing which output ultimately produces the sound. A voice can be
//! routed to the module's own [CV/gate](https://en.wikipedia.org/wiki/CV/gate) outputs or to any of several
//! I2C-addressed devices (ER-301, Just Friends, TELEXo, disting EX, i2c2midi), each with its own command set.
//!
//! The crate is organized leaves first:
//! - [`pitch`] converts between MIDI notes and the 14-bit pitch values used throughout.
//! - [`routing`] and [`parameters`] hold the voice map and the per-output transpose, volume, and mute settings.
//! - [`devices`] encodes notes into the exact messages each device family expects.
//! - [`multipass`] ties these together into the note dispatch engine.
//! - [`timers`], [`events`], [`scheduler`], and [`runtime`] drive the engine from a cooperative run loop.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

// must come first so the logging macros are visible to the modules below
#[macro_use]
mod fmt;

pub mod bus;
pub mod configuration;
pub mod devices;
pub mod events;
pub mod io;
pub mod multipass;
pub mod parameters;
pub mod pitch;
pub mod routing;
pub mod runtime;
pub mod scheduler;
pub mod timers;

#[cfg(test)]
mod test_support;
