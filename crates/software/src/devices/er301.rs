//! Orthogonal Devices ER-301, addressed through its SC.CV and SC.TR units.
//!
//! Each note output uses two CV channels: pitch on the output itself and volume on the output 16 above it.

use embedded_hal::i2c::I2c;

use super::command::{CV_SET, TR};
use super::{PITCH_CENTER, address, be};
use crate::bus::Bus;

/// The number of CV/TR channels the raw setters accept.
pub const MAX_CHANNELS: usize = 100;

/// Distance from a note output to the channel carrying its volume.
const VOLUME_CHANNEL_OFFSET: usize = 16;

/// Sets CV channel `output` to `value`. Ignored for channels past [`MAX_CHANNELS`].
pub fn set_cv<I: I2c>(bus: &mut Bus<I>, output: usize, value: i16) {
    if output >= MAX_CHANNELS {
        debug!("no ER-301 channel {}", output);
        return;
    }
    let [hi, lo] = be(value);
    bus.send(address::ER301, &[CV_SET, output as u8, hi, lo]);
}

/// Sets trigger channel `output`, sending the message twice. Ignored for channels past [`MAX_CHANNELS`].
pub fn set_gate<I: I2c>(bus: &mut Bus<I>, output: usize, on: bool) {
    if output >= MAX_CHANNELS {
        debug!("no ER-301 channel {}", output);
        return;
    }
    let frame = [TR, output as u8, 0, on as u8];
    bus.send(address::ER301, &frame);
    bus.send(address::ER301, &frame);
}

/// Plays `pitch` at `volume` on `output`.
pub fn note_on<I: I2c>(bus: &mut Bus<I>, output: usize, pitch: i16, volume: u16) {
    set_cv(bus, output, pitch.saturating_add(PITCH_CENTER));
    set_cv(bus, output + VOLUME_CHANNEL_OFFSET, volume as i16);
    set_gate(bus, output, true);
}

/// Releases `output`.
pub fn note_off<I: I2c>(bus: &mut Bus<I>, output: usize) {
    set_gate(bus, output, false);
}
