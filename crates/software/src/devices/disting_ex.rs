//! Expert Sleepers disting EX, played through its per-channel note commands.
//!
//! Each unit takes eight channels, so output `n` is channel `n % 8` of the unit at `0x41 + n / 8`. A note is
//! identified by its MIDI number on the disting, which means releasing a note requires knowing which number it was
//! started with.

use embedded_hal::i2c::I2c;
use wmidi::{Note, U7};

use super::{DeviceFamily, PITCH_CENTER, address, be};
use crate::bus::Bus;
use crate::pitch::semitones;

const NOTE_PITCH: u8 = 0x68;
const NOTE_ON: u8 = 0x69;
const NOTE_OFF: u8 = 0x6A;

/// Channels per disting EX.
const CHANNELS_PER_UNIT: usize = 8;

/// The disting's note numbers sit four octaves above the module's.
const NOTE_OFFSET: i32 = 48;

const OUTPUT_COUNT: usize = DeviceFamily::DistingEx.output_count();

/// The note each disting EX output is currently sounding.
#[derive(Debug, Clone, PartialEq)]
pub struct DistingEx {
    sounding: [Option<Note>; OUTPUT_COUNT],
}

impl Default for DistingEx {
    fn default() -> Self {
        Self {
            sounding: [None; OUTPUT_COUNT],
        }
    }
}

impl DistingEx {
    /// The note `output` is sounding, if any.
    pub fn sounding(&self, output: usize) -> Option<Note> {
        self.sounding.get(output).copied().flatten()
    }

    /// Releases whatever `output` is playing, then, if `volume` is above 0, starts `pitch` on it.
    pub fn note<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, pitch: i16, volume: u16) {
        if output >= OUTPUT_COUNT {
            return;
        }
        let pitch = pitch.saturating_add(PITCH_CENTER);
        let note = Note::from(U7::from_u8_lossy((semitones(pitch) + NOTE_OFFSET).clamp(0, 127) as u8));
        let unit = address::DISTING_EX + (output / CHANNELS_PER_UNIT) as u8;
        let channel = (output % CHANNELS_PER_UNIT) as u8;

        let release = self.sounding[output].take().unwrap_or(note);
        bus.send(unit, &[NOTE_OFF, channel, u8::from(release)]);

        if volume > 0 {
            let [pitch_hi, pitch_lo] = be(pitch);
            let [volume_hi, volume_lo] = be(volume as i16);
            bus.send(unit, &[NOTE_PITCH, channel, u8::from(note), pitch_hi, pitch_lo]);
            bus.send(unit, &[NOTE_ON, channel, u8::from(note), volume_hi, volume_lo]);
            self.sounding[output] = Some(note);
        }
    }

    /// Releases the note `output` is sounding, or the note `pitch` maps to if it isn't sounding one.
    pub fn note_off<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, pitch: i16) {
        self.note(bus, output, pitch, 0);
    }
}
