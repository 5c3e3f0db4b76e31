//! Devices that accept MIDI note messages over I2C: the disting EX's MIDI input and i2c2midi.

use embedded_hal::i2c::I2c;
use wmidi::{Channel, MidiMessage, Note, U7};

use super::address;
use crate::bus::Bus;
use crate::pitch::pitch_to_note;

/// Outputs (and, in per-output mode, channels) a bridge exposes.
pub const OUTPUT_COUNT: usize = 16;

/// disting EX command which wraps a raw MIDI message.
const DISTING_MIDI: u8 = 0x4F;

const I2C2MIDI_NOTE_ON: u8 = 20;
const I2C2MIDI_NOTE_OFF: u8 = 21;

/// The device on the far side of the bridge.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// A disting EX, which takes raw MIDI bytes.
    DistingEx,
    /// i2c2midi, which takes its own note commands.
    I2c2Midi,
}

/// How outputs map to MIDI channels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelMode {
    /// Every output plays on channel 1.
    Single,
    /// Output `n` plays on channel `n + 1`.
    PerOutput,
}

/// One MIDI-speaking device family, remembering the note each output is sounding so it can be released.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiBridge {
    target: Target,
    channels: ChannelMode,
    sounding: [Option<Note>; OUTPUT_COUNT],
}

impl MidiBridge {
    /// Creates a bridge with nothing sounding.
    pub const fn new(target: Target, channels: ChannelMode) -> Self {
        Self {
            target,
            channels,
            sounding: [None; OUTPUT_COUNT],
        }
    }

    /// The note `output` is sounding, if any.
    pub fn sounding(&self, output: usize) -> Option<Note> {
        self.sounding.get(output).copied().flatten()
    }

    fn channel(&self, output: usize) -> Channel {
        match self.channels {
            ChannelMode::Single => Channel::Ch1,
            ChannelMode::PerOutput => Channel::from_index(output as u8).unwrap_or(Channel::Ch1),
        }
    }

    fn send<I: I2c>(&self, bus: &mut Bus<I>, message: MidiMessage<'_>) {
        match (self.target, message) {
            (Target::DistingEx, message) => {
                let mut frame = [DISTING_MIDI, 0, 0, 0];
                if message.copy_to_slice(&mut frame[1..]).is_ok() {
                    bus.send(address::DISTING_EX, &frame);
                }
            }
            (Target::I2c2Midi, MidiMessage::NoteOn(channel, note, velocity)) => {
                bus.send(
                    address::I2C2MIDI,
                    &[I2C2MIDI_NOTE_ON, channel.index(), u8::from(note), u8::from(velocity)],
                );
            }
            (Target::I2c2Midi, MidiMessage::NoteOff(channel, note, _)) => {
                bus.send(address::I2C2MIDI, &[I2C2MIDI_NOTE_OFF, channel.index(), u8::from(note)]);
            }
            (Target::I2c2Midi, _) => {}
        }
    }

    /// Starts the note nearest `pitch` on `output` with a velocity taken from the top seven bits of `volume`.
    ///
    /// A volume too low to produce a velocity releases the output instead.
    pub fn note_on<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, pitch: i16, volume: u16) {
        if output >= OUTPUT_COUNT {
            return;
        }
        let velocity = U7::from_u8_lossy((volume >> 7) as u8);
        if u8::from(velocity) == 0 {
            self.note_off(bus, output, pitch);
            return;
        }
        let note = pitch_to_note(pitch);
        self.send(bus, MidiMessage::NoteOn(self.channel(output), note, velocity));
        self.sounding[output] = Some(note);
    }

    /// Releases the note `output` is sounding, or the note nearest `pitch` if it isn't sounding one.
    pub fn note_off<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, pitch: i16) {
        if output >= OUTPUT_COUNT {
            return;
        }
        let note = self.sounding[output].take().unwrap_or_else(|| pitch_to_note(pitch));
        self.send(bus, MidiMessage::NoteOff(self.channel(output), note, U7::MIN));
    }
}
