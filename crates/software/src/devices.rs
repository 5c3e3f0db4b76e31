//! Device families and the encoders that turn notes into the messages each family understands.
//!
//! Every encoder follows the same outline: add the output's transpose (and any centering offset the device needs),
//! treat a volume of 0 as "off," and otherwise scale the volume by the output's maximum and emit the "on" sequence.
//! Encoders talk to I2C devices through [`Bus::send`](crate::bus::Bus::send), so a failed transaction never stops
//! dispatch to the next output.

use num_derive::{FromPrimitive, ToPrimitive};

pub mod cv_gate;
pub mod disting_ex;
pub mod er301;
pub mod just_friends;
pub mod midi_bridge;
pub mod telexo;

/// Commands shared by the TELEX-style devices (ER-301, TELEXo).
pub mod command {
    /// Sets a gate/trigger output.
    pub const TR: u8 = 0x00;
    /// Sets a CV output.
    pub const CV_SET: u8 = 0x11;
    /// Sets an oscillator's pitch.
    pub const OSC_SET: u8 = 0x41;
    /// Selects an oscillator's waveform.
    pub const OSC_WAVE: u8 = 0x4A;
    /// Turns an output's envelope on or off.
    pub const ENV_ACT: u8 = 0x60;
    /// Sets an envelope's attack time.
    pub const ENV_ATT: u8 = 0x61;
    /// Sets an envelope's decay time.
    pub const ENV_DEC: u8 = 0x64;
    /// Triggers (1) or releases (0) an envelope.
    pub const ENV: u8 = 0x6D;
}

/// I2C addresses of the supported devices. Devices which span several units start at these and count up.
pub mod address {
    /// The first ER-301.
    pub const ER301: u8 = 0x31;
    /// Just Friends.
    pub const JUST_FRIENDS: u8 = 0x70;
    /// The first TELEXo; each unit has four outputs.
    pub const TELEXO: u8 = 0x60;
    /// The first TELEXi; each unit has four inputs.
    pub const TELEXI: u8 = 0x68;
    /// The first disting EX.
    pub const DISTING_EX: u8 = 0x41;
    /// i2c2midi.
    pub const I2C2MIDI: u8 = 0x3F;
}

/// Offset which centers pitches on ER-301, Just Friends, and disting EX, whose 0V sits two octaves higher than
/// the module's.
pub const PITCH_CENTER: i16 = -3277;

/// The kinds of output a voice can be routed to.
///
/// The discriminants are the wire values applications use to refer to a family, and the declaration order is the order
/// in which [`Multipass::note_on`](crate::multipass::Multipass::note_on) visits families.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceFamily {
    /// The module's own CV and gate outputs.
    CvGate = 0,
    /// Orthogonal Devices ER-301 SC.TR/SC.CV units.
    Er301 = 1,
    /// Mannequins Just Friends in synthesis mode.
    JustFriends = 2,
    /// TELEXo outputs used as enveloped oscillators.
    TxoNote = 3,
    /// TELEXo outputs used as plain CV and gate.
    TxoCvGate = 4,
    /// disting EX algorithms driven through the note commands.
    DistingEx = 5,
    /// disting EX as a MIDI target, all outputs on channel 1.
    ExMidi1 = 6,
    /// disting EX as a MIDI target, one channel per output.
    ExMidiCh = 7,
    /// i2c2midi, all outputs on channel 1.
    I2c2Midi1 = 8,
    /// i2c2midi, one channel per output.
    I2c2MidiCh = 9,
}

impl DeviceFamily {
    /// The number of families.
    pub const COUNT: usize = 10;

    /// The largest number of outputs any family has.
    pub const MAX_OUTPUTS: usize = 32;

    /// All families in dispatch order.
    pub const ALL: [DeviceFamily; Self::COUNT] = [
        Self::CvGate,
        Self::Er301,
        Self::JustFriends,
        Self::TxoNote,
        Self::TxoCvGate,
        Self::DistingEx,
        Self::ExMidi1,
        Self::ExMidiCh,
        Self::I2c2Midi1,
        Self::I2c2MidiCh,
    ];

    /// Returns the number of outputs a voice can be routed to within this family.
    pub const fn output_count(self) -> usize {
        match self {
            Self::CvGate => 4,
            Self::JustFriends => 6,
            Self::DistingEx => 32,
            Self::Er301
            | Self::TxoNote
            | Self::TxoCvGate
            | Self::ExMidi1
            | Self::ExMidiCh
            | Self::I2c2Midi1
            | Self::I2c2MidiCh => 16,
        }
    }

    /// Returns false for families whose outputs only know "on" and "off," which therefore ignore max volume.
    pub const fn has_volume(self) -> bool {
        !matches!(self, Self::CvGate | Self::TxoCvGate)
    }

    /// Returns the family's position in [`DeviceFamily::ALL`] (which is also its wire value).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true when `output` is a valid output of this family.
    pub const fn contains(self, output: usize) -> bool {
        output < self.output_count()
    }
}

/// Splits a 16-bit value into the big-endian byte pair every device expects.
pub(crate) fn be(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use num_traits::FromPrimitive;

    use super::*;

    #[test]
    fn wire_values_follow_dispatch_order() {
        for (i, family) in DeviceFamily::ALL.iter().enumerate() {
            assert_eq!(i, family.index(), "Expected left but got right");
            assert_eq!(
                Some(*family),
                DeviceFamily::from_usize(i),
                "Expected left but got right"
            );
        }
        assert_eq!(None, DeviceFamily::from_u8(10), "Expected left but got right");
    }

    #[test]
    fn output_ceilings() {
        assert_eq!(4, DeviceFamily::CvGate.output_count(), "Expected left but got right");
        assert_eq!(6, DeviceFamily::JustFriends.output_count(), "Expected left but got right");
        assert_eq!(32, DeviceFamily::DistingEx.output_count(), "Expected left but got right");
        assert!(
            DeviceFamily::ALL
                .iter()
                .all(|f| f.output_count() <= DeviceFamily::MAX_OUTPUTS),
            "No family should exceed the routing table's width"
        );
        assert!(!DeviceFamily::Er301.contains(16), "ER-301 should have 16 outputs");
    }

    #[test]
    fn gate_only_families_have_no_volume() {
        assert!(!DeviceFamily::CvGate.has_volume(), "CV/gate should not have volume");
        assert!(!DeviceFamily::TxoCvGate.has_volume(), "TXo CV/gate should not have volume");
        assert!(DeviceFamily::TxoNote.has_volume(), "TXo note should have volume");
    }

    #[test]
    fn values_are_big_endian() {
        assert_eq!([0x20, 0x00], be(8192), "Expected left but got right");
        assert_eq!([0xF3, 0x33], be(-3277), "Expected left but got right");
    }
}
