//! bpcmusic TELEXo outputs and TELEXi inputs.
//!
//! Expanders are chained four outputs (or inputs) per unit, so output `n` lives on port `n % 4` of the unit at
//! `base + n / 4`. Every TELEXo command has the same shape: command, port, then a big-endian value.
//!
//! Envelope and waveform settings tend to arrive from knobs many times a second. They are recorded here and only
//! sent when [`Telexo::refresh`] runs, so a burst of changes costs one message per parameter.

use bitmask_enum::bitmask;
use embedded_hal::i2c::I2c;

use super::command::{CV_SET, ENV, ENV_ACT, ENV_ATT, ENV_DEC, OSC_SET, OSC_WAVE, TR};
use super::{address, be};
use crate::bus::Bus;
use crate::configuration::TxoMode;

/// Outputs (and inputs) per expander unit.
const PORTS_PER_UNIT: usize = 4;

/// The number of TELEXo outputs that can be addressed.
pub const OUTPUT_COUNT: usize = 16;

/// The number of TELEXi inputs that can be read.
pub const INPUT_COUNT: usize = 16;

/// Offset which centers pitches on a TELEXo oscillator.
pub const OSCILLATOR_CENTER: i16 = 4915;

/// Parameters changed since the last refresh.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Dirty {
    Attack,
    Decay,
    Waveform,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    dirty: Dirty,
    attack: u16,
    decay: u16,
    waveform: u16,
}

impl Default for Pending {
    fn default() -> Self {
        Self {
            dirty: Dirty::none(),
            attack: 0,
            decay: 0,
            waveform: 0,
        }
    }
}

/// Per-output TELEXo state: the mode each output was last put in and its unsent envelope/waveform settings.
#[derive(Debug, Clone)]
pub struct Telexo {
    modes: [Option<TxoMode>; OUTPUT_COUNT],
    pending: [Pending; OUTPUT_COUNT],
}

impl Default for Telexo {
    fn default() -> Self {
        Self {
            modes: [None; OUTPUT_COUNT],
            pending: [Pending::default(); OUTPUT_COUNT],
        }
    }
}

fn send<I: I2c>(bus: &mut Bus<I>, output: usize, command: u8, value: i16) -> usize {
    let unit = (output / PORTS_PER_UNIT) as u8;
    let port = (output % PORTS_PER_UNIT) as u8;
    let [hi, lo] = be(value);
    bus.send(address::TELEXO + unit, &[command, port, hi, lo])
}

impl Telexo {
    /// The mode `output` was last put in, if any. Only setups which reached the bus count.
    pub fn mode(&self, output: usize) -> Option<TxoMode> {
        self.modes.get(output).copied().flatten()
    }

    /// Puts `output` in `mode`, sending the mode's setup commands even if the output is already in it.
    pub fn set_mode<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, mode: TxoMode) {
        if output >= OUTPUT_COUNT {
            debug!("no TELEXo output {}", output);
            return;
        }
        let delivered = match mode {
            TxoMode::Envelope => send(bus, output, ENV_ACT, 1) > 0,
            TxoMode::Oscillator => {
                let deactivated = send(bus, output, ENV_ACT, 0) > 0;
                send(bus, output, OSC_SET, 0) > 0 && deactivated
            }
        };
        self.modes[output] = delivered.then_some(mode);
    }

    /// Sets `output` to a fixed CV, switching it to oscillator mode first.
    pub fn set_cv<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, value: i16) {
        if output >= OUTPUT_COUNT {
            debug!("no TELEXo output {}", output);
            return;
        }
        self.set_mode(bus, output, TxoMode::Oscillator);
        send(bus, output, CV_SET, value);
    }

    /// Releases the envelope of `output` and sets its trigger.
    pub fn set_gate<I: I2c>(&self, bus: &mut Bus<I>, output: usize, on: bool) {
        if output >= OUTPUT_COUNT {
            debug!("no TELEXo output {}", output);
            return;
        }
        send(bus, output, ENV, 0);
        send(bus, output, TR, on as i16);
    }

    /// Records a new envelope attack for `output`, to be sent on the next refresh.
    pub fn set_attack(&mut self, output: usize, attack: u16) {
        if let Some(pending) = self.pending.get_mut(output) {
            pending.attack = attack;
            pending.dirty |= Dirty::Attack;
        }
    }

    /// Records a new envelope decay for `output`, to be sent on the next refresh.
    pub fn set_decay(&mut self, output: usize, decay: u16) {
        if let Some(pending) = self.pending.get_mut(output) {
            pending.decay = decay;
            pending.dirty |= Dirty::Decay;
        }
    }

    /// Records a new oscillator waveform for `output`, to be sent on the next refresh.
    pub fn set_waveform(&mut self, output: usize, waveform: u16) {
        if let Some(pending) = self.pending.get_mut(output) {
            pending.waveform = waveform;
            pending.dirty |= Dirty::Waveform;
        }
    }

    /// Sends every recorded change, output by output, and forgets them.
    pub fn refresh<I: I2c>(&mut self, bus: &mut Bus<I>) {
        for (output, pending) in self.pending.iter_mut().enumerate() {
            let dirty = core::mem::replace(&mut pending.dirty, Dirty::none());
            if dirty.contains(Dirty::Attack) {
                send(bus, output, ENV_ATT, pending.attack as i16);
            }
            if dirty.contains(Dirty::Decay) {
                send(bus, output, ENV_DEC, pending.decay as i16);
            }
            if dirty.contains(Dirty::Waveform) {
                send(bus, output, OSC_WAVE, pending.waveform as i16);
            }
        }
    }

    /// Plays `pitch` at `volume` on the enveloped oscillator of `output`.
    pub fn note_on<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, pitch: i16, volume: u16) {
        if output >= OUTPUT_COUNT {
            return;
        }
        self.set_mode(bus, output, TxoMode::Envelope);
        send(bus, output, OSC_SET, pitch.saturating_add(OSCILLATOR_CENTER));
        send(bus, output, CV_SET, volume as i16);
        send(bus, output, ENV, 1);
    }

    /// Releases the envelope of `output`.
    pub fn note_off<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize) {
        if output >= OUTPUT_COUNT {
            return;
        }
        self.set_mode(bus, output, TxoMode::Envelope);
        send(bus, output, ENV, 0);
    }

    /// Sets `output` to `pitch` as plain CV and raises its trigger.
    pub fn cv_gate_on<I: I2c>(&mut self, bus: &mut Bus<I>, output: usize, pitch: i16) {
        self.set_cv(bus, output, pitch);
        self.set_gate(bus, output, true);
    }

    /// Lowers the trigger of `output`.
    pub fn cv_gate_off<I: I2c>(&self, bus: &mut Bus<I>, output: usize) {
        self.set_gate(bus, output, false);
    }
}

fn read_txi<I: I2c>(bus: &mut Bus<I>, index: usize, port_offset: u8) -> i16 {
    let unit = (index / PORTS_PER_UNIT) as u8;
    let port = (index % PORTS_PER_UNIT) as u8 + port_offset;
    let mut response = [0; 2];
    match bus.read(address::TELEXI + unit, &[port], &mut response) {
        Ok(()) => i16::from_be_bytes(response),
        Err(e) => {
            debug!("TELEXi read failed: {}", e);
            0
        }
    }
}

/// Reads CV input `input` of a TELEXi. Returns 0 for inputs that don't exist or can't be read.
pub fn get_txi_input<I: I2c>(bus: &mut Bus<I>, input: usize) -> i16 {
    if input >= INPUT_COUNT {
        return 0;
    }
    read_txi(bus, input, PORTS_PER_UNIT as u8)
}

/// Reads knob `param` of a TELEXi, scaled to the range of the module's own knobs. Returns 0 for knobs that don't
/// exist or can't be read.
pub fn get_txi_param<I: I2c>(bus: &mut Bus<I>, param: usize) -> i16 {
    if param >= INPUT_COUNT {
        return 0;
    }
    read_txi(bus, param, 0) << 2
}
