//! Mannequins Just Friends, played through its synthesis-mode voice commands.

use embedded_hal::i2c::I2c;

use super::{DeviceFamily, PITCH_CENTER, address, be};
use crate::bus::Bus;

const TR: u8 = 1;
const MODE: u8 = 6;
const VOX: u8 = 8;

/// Tracks the one piece of Just Friends state that isn't per-output: whether synthesis mode is on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JustFriends {
    synthesis: bool,
}

impl JustFriends {
    /// Returns true if synthesis mode was last switched on.
    pub fn mode(&self) -> bool {
        self.synthesis
    }

    /// Switches synthesis mode on or off. Nothing is sent if the mode is unchanged.
    pub fn set_mode<I: I2c>(&mut self, bus: &mut Bus<I>, synthesis: bool) {
        if self.synthesis == synthesis {
            return;
        }
        info!("Just Friends synthesis mode {}", synthesis);
        self.synthesis = synthesis;
        bus.send(address::JUST_FRIENDS, &[MODE, synthesis as u8]);
    }

    /// Sets the trigger of channel `output` (0-based).
    pub fn set_gate<I: I2c>(&self, bus: &mut Bus<I>, output: usize, on: bool) {
        if !DeviceFamily::JustFriends.contains(output) {
            debug!("no Just Friends channel {}", output);
            return;
        }
        bus.send(address::JUST_FRIENDS, &[TR, output as u8 + 1, on as u8]);
    }

    /// Plays `pitch` at `volume` on `output`, then sets its trigger to match whether the note is audible.
    pub fn note_on<I: I2c>(&self, bus: &mut Bus<I>, output: usize, pitch: i16, volume: u16) {
        if !DeviceFamily::JustFriends.contains(output) {
            return;
        }
        let [pitch_hi, pitch_lo] = be(pitch.saturating_add(PITCH_CENTER));
        let [volume_hi, volume_lo] = be(volume as i16);
        bus.send(
            address::JUST_FRIENDS,
            &[VOX, output as u8 + 1, pitch_hi, pitch_lo, volume_hi, volume_lo],
        );
        self.set_gate(bus, output, volume > 0);
    }

    /// Releases `output`.
    pub fn note_off<I: I2c>(&self, bus: &mut Bus<I>, output: usize) {
        self.set_gate(bus, output, false);
    }
}
