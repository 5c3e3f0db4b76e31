//! The note dispatch engine.

use embedded_hal::i2c::I2c;
use wmidi::Note;

use crate::bus::Bus;
use crate::configuration::{BusRole, TxoMode};
use crate::devices::midi_bridge::{ChannelMode, MidiBridge, Target};
use crate::devices::{
    DeviceFamily, cv_gate, disting_ex::DistingEx, er301, just_friends::JustFriends, telexo, telexo::Telexo,
};
use crate::io::CvGateOutputs;
use crate::parameters::OutputParameters;
use crate::pitch::note_to_pitch;
use crate::routing::{MAX_VOICES, VoiceMap};

/// Owns everything a note passes through on its way out of the module: the voice routing, per-output parameters,
/// per-device state, and the hardware seams.
///
/// Applications play notes on voices. Each voice can be routed to any number of outputs across every
/// [`DeviceFamily`], and [`Multipass::note_on`] fans a note out to all of them, family by family in
/// [`DeviceFamily::ALL`] order and output by output in ascending order.
///
/// Every operation which takes an index ignores indices that are out of range.
pub struct Multipass<I: I2c, O: CvGateOutputs> {
    bus: Bus<I>,
    outputs: O,
    routing: VoiceMap,
    parameters: OutputParameters,
    last_pitch: [i16; MAX_VOICES],
    just_friends: JustFriends,
    telexo: Telexo,
    disting_ex: DistingEx,
    ex_midi_1: MidiBridge,
    ex_midi_ch: MidiBridge,
    i2c2midi_1: MidiBridge,
    i2c2midi_ch: MidiBridge,
}

impl<I: I2c, O: CvGateOutputs> Multipass<I, O> {
    /// Creates an engine which starts as an I2C follower, with voice `n` routed to the module's own output `n` for
    /// every output the hardware has.
    pub fn new(i2c: I, outputs: O) -> Self {
        let mut routing = VoiceMap::default();
        let direct = outputs
            .cv_output_count()
            .max(outputs.gate_output_count())
            .min(DeviceFamily::CvGate.output_count());
        for output in 0..direct {
            routing.map(output, DeviceFamily::CvGate, output, true);
        }

        Self {
            bus: Bus::new(i2c),
            outputs,
            routing,
            parameters: OutputParameters::default(),
            last_pitch: [0; MAX_VOICES],
            just_friends: JustFriends::default(),
            telexo: Telexo::default(),
            disting_ex: DistingEx::default(),
            ex_midi_1: MidiBridge::new(Target::DistingEx, ChannelMode::Single),
            ex_midi_ch: MidiBridge::new(Target::DistingEx, ChannelMode::PerOutput),
            i2c2midi_1: MidiBridge::new(Target::I2c2Midi, ChannelMode::Single),
            i2c2midi_ch: MidiBridge::new(Target::I2c2Midi, ChannelMode::PerOutput),
        }
    }

    /// Plays `pitch` at `volume` on every output `voice` is routed to. A volume of 0 releases the voice instead.
    pub fn note_on(&mut self, voice: usize, pitch: i16, volume: u16) {
        if voice >= MAX_VOICES {
            debug!("no voice {}", voice);
            return;
        }
        self.last_pitch[voice] = pitch;
        self.dispatch(voice, pitch, volume);
    }

    /// Releases `voice` on every output it is routed to *now*, using the pitch it was last played at.
    ///
    /// Outputs unrouted (or muted) since the note started are not released.
    pub fn note_off(&mut self, voice: usize) {
        if voice >= MAX_VOICES {
            debug!("no voice {}", voice);
            return;
        }
        self.dispatch(voice, self.last_pitch[voice], 0);
    }

    /// Plays `note` at `volume` on `voice`; see [`Multipass::note_on`].
    pub fn note_on_note(&mut self, voice: usize, note: Note, volume: u16) {
        self.note_on(voice, note_to_pitch(note), volume);
    }

    /// Plays (`on`) or releases `voice`.
    pub fn note(&mut self, voice: usize, pitch: i16, volume: u16, on: bool) {
        if on {
            self.note_on(voice, pitch, volume);
        } else {
            self.note_off(voice);
        }
    }

    fn dispatch(&mut self, voice: usize, pitch: i16, volume: u16) {
        for family in DeviceFamily::ALL {
            if self.parameters.is_muted(family) {
                continue;
            }
            for output in self.routing.outputs(voice, family) {
                self.send_note(family, output, pitch, volume);
            }
        }
    }

    fn send_note(&mut self, family: DeviceFamily, output: usize, pitch: i16, volume: u16) {
        let pitch = pitch.saturating_add(self.parameters.transpose(family, output));
        if volume == 0 {
            self.release(family, output, pitch);
            return;
        }
        let volume = self.parameters.scaled_volume(family, output, volume);
        let bus = &mut self.bus;

        match family {
            DeviceFamily::CvGate => cv_gate::note_on(&mut self.outputs, output, pitch),
            DeviceFamily::Er301 => er301::note_on(bus, output, pitch, volume),
            DeviceFamily::JustFriends => self.just_friends.note_on(bus, output, pitch, volume),
            DeviceFamily::TxoNote => self.telexo.note_on(bus, output, pitch, volume),
            DeviceFamily::TxoCvGate => self.telexo.cv_gate_on(bus, output, pitch),
            DeviceFamily::DistingEx => self.disting_ex.note(bus, output, pitch, volume),
            DeviceFamily::ExMidi1 => self.ex_midi_1.note_on(bus, output, pitch, volume),
            DeviceFamily::ExMidiCh => self.ex_midi_ch.note_on(bus, output, pitch, volume),
            DeviceFamily::I2c2Midi1 => self.i2c2midi_1.note_on(bus, output, pitch, volume),
            DeviceFamily::I2c2MidiCh => self.i2c2midi_ch.note_on(bus, output, pitch, volume),
        }
    }

    fn release(&mut self, family: DeviceFamily, output: usize, pitch: i16) {
        let bus = &mut self.bus;

        match family {
            DeviceFamily::CvGate => cv_gate::note_off(&mut self.outputs, output),
            DeviceFamily::Er301 => er301::note_off(bus, output),
            DeviceFamily::JustFriends => self.just_friends.note_off(bus, output),
            DeviceFamily::TxoNote => self.telexo.note_off(bus, output),
            DeviceFamily::TxoCvGate => self.telexo.cv_gate_off(bus, output),
            DeviceFamily::DistingEx => self.disting_ex.note_off(bus, output, pitch),
            DeviceFamily::ExMidi1 => self.ex_midi_1.note_off(bus, output, pitch),
            DeviceFamily::ExMidiCh => self.ex_midi_ch.note_off(bus, output, pitch),
            DeviceFamily::I2c2Midi1 => self.i2c2midi_1.note_off(bus, output, pitch),
            DeviceFamily::I2c2MidiCh => self.i2c2midi_ch.note_off(bus, output, pitch),
        }
    }

    /// Routes `voice` to (or away from) `output` of `family`.
    pub fn map_voice(&mut self, voice: usize, family: DeviceFamily, output: usize, enabled: bool) {
        self.routing.map(voice, family, output, enabled);
    }

    /// Returns true when notes on `voice` would currently reach `output` of `family`: it is routed there and the
    /// family isn't muted.
    pub fn is_mapped(&self, voice: usize, family: DeviceFamily, output: usize) -> bool {
        self.routing.is_set(voice, family, output) && !self.parameters.is_muted(family)
    }

    /// Offsets every pitch sent to `output` of `family`.
    pub fn set_output_transpose(&mut self, family: DeviceFamily, output: usize, offset: i16) {
        self.parameters.set_transpose(family, output, offset);
    }

    /// Offsets every pitch sent to `output` of `family` by the pitch of `note`.
    pub fn set_output_transpose_note(&mut self, family: DeviceFamily, output: usize, note: Note) {
        self.parameters.set_transpose_note(family, output, note);
    }

    /// Caps the volume of `output` of `family`. Ignored for families without a volume dimension.
    pub fn set_output_max_volume(&mut self, family: DeviceFamily, output: usize, volume: u16) {
        self.parameters.set_max_volume(family, output, volume);
    }

    /// Silences (or restores) a whole family. Routing is left untouched.
    pub fn mute_device(&mut self, family: DeviceFamily, muted: bool) {
        info!("{} muted: {}", family, muted);
        self.parameters.set_muted(family, muted);
    }

    /// Puts `output` of a TELEXo family in `mode`. Ignored for other families.
    pub fn set_output_mode(&mut self, family: DeviceFamily, output: usize, mode: TxoMode) {
        match family {
            DeviceFamily::TxoNote | DeviceFamily::TxoCvGate => self.telexo.set_mode(&mut self.bus, output, mode),
            _ => debug!("{} has no output modes", family),
        }
    }

    /// The shared read-only view of per-output parameters.
    pub fn parameters(&self) -> &OutputParameters {
        &self.parameters
    }

    /// The pitch `voice` was last played at (0 until it is played).
    pub fn last_pitch(&self, voice: usize) -> i16 {
        self.last_pitch.get(voice).copied().unwrap_or(0)
    }

    /// Sets the module's own CV output `output`.
    pub fn set_cv(&mut self, output: usize, value: i16) {
        cv_gate::set_cv(&mut self.outputs, output, value);
    }

    /// Sets the module's own gate output `output`.
    pub fn set_gate(&mut self, output: usize, high: bool) {
        cv_gate::set_gate(&mut self.outputs, output, high);
    }

    /// Zeroes the module's own CV outputs and closes its gates.
    pub fn reset_outputs(&mut self) {
        cv_gate::reset(&mut self.outputs);
    }

    /// Sets ER-301 CV channel `output`.
    pub fn set_er301_cv(&mut self, output: usize, value: i16) {
        er301::set_cv(&mut self.bus, output, value);
    }

    /// Sets ER-301 trigger channel `output`.
    pub fn set_er301_gate(&mut self, output: usize, on: bool) {
        er301::set_gate(&mut self.bus, output, on);
    }

    /// Switches Just Friends' synthesis mode.
    pub fn set_jf_mode(&mut self, synthesis: bool) {
        self.just_friends.set_mode(&mut self.bus, synthesis);
    }

    /// Sets a Just Friends trigger.
    pub fn set_jf_gate(&mut self, output: usize, on: bool) {
        self.just_friends.set_gate(&mut self.bus, output, on);
    }

    /// Puts TELEXo `output` in `mode`.
    pub fn set_txo_mode(&mut self, output: usize, mode: TxoMode) {
        self.telexo.set_mode(&mut self.bus, output, mode);
    }

    /// Sets TELEXo `output` to a fixed CV.
    pub fn set_txo_cv(&mut self, output: usize, value: i16) {
        self.telexo.set_cv(&mut self.bus, output, value);
    }

    /// Sets the trigger of TELEXo `output`.
    pub fn set_txo_gate(&mut self, output: usize, on: bool) {
        self.telexo.set_gate(&mut self.bus, output, on);
    }

    /// Records the envelope attack of TELEXo `output`; sent by [`Multipass::refresh_devices`].
    pub fn set_txo_attack(&mut self, output: usize, attack: u16) {
        self.telexo.set_attack(output, attack);
    }

    /// Records the envelope decay of TELEXo `output`; sent by [`Multipass::refresh_devices`].
    pub fn set_txo_decay(&mut self, output: usize, decay: u16) {
        self.telexo.set_decay(output, decay);
    }

    /// Records the oscillator waveform of TELEXo `output`; sent by [`Multipass::refresh_devices`].
    pub fn set_txo_waveform(&mut self, output: usize, waveform: u16) {
        self.telexo.set_waveform(output, waveform);
    }

    /// Reads TELEXi CV input `input`, or 0 if it can't be read.
    pub fn get_txi_input(&mut self, input: usize) -> i16 {
        telexo::get_txi_input(&mut self.bus, input)
    }

    /// Reads TELEXi knob `param`, or 0 if it can't be read.
    pub fn get_txi_param(&mut self, param: usize) -> i16 {
        telexo::get_txi_param(&mut self.bus, param)
    }

    /// Sends every device setting recorded since the last refresh.
    pub fn refresh_devices(&mut self) {
        self.telexo.refresh(&mut self.bus);
    }

    /// Takes control of the I2C bus.
    pub fn set_as_i2c_leader(&mut self) {
        if !self.bus.is_leader() {
            self.bus.set_role(BusRole::Leader);
        }
    }

    /// Gives up control of the I2C bus and answers to `address` instead.
    ///
    /// Leaving the leader role also turns off Just Friends' synthesis mode in the engine's bookkeeping; the message
    /// itself can no longer be sent.
    pub fn set_as_i2c_follower(&mut self, address: u8) {
        let was_leader = self.bus.is_leader();
        self.bus.set_role(BusRole::Follower { address });
        if was_leader {
            self.just_friends.set_mode(&mut self.bus, false);
        }
    }

    /// The I2C bus.
    pub fn bus(&self) -> &Bus<I> {
        &self.bus
    }

    /// The I2C bus, mutably.
    pub fn bus_mut(&mut self) -> &mut Bus<I> {
        &mut self.bus
    }

    /// The module's own outputs.
    pub fn outputs(&self) -> &O {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{OutputWrite, RecordingI2c, RecordingOutputs};

    fn leader() -> Multipass<RecordingI2c, RecordingOutputs> {
        let mut multipass = Multipass::new(RecordingI2c::default(), RecordingOutputs::default());
        multipass.set_as_i2c_leader();
        multipass
    }

    fn writes(multipass: &Multipass<RecordingI2c, RecordingOutputs>) -> &[(u8, Vec<u8>)] {
        &multipass.bus().i2c().writes
    }

    #[test]
    fn voices_start_on_the_direct_outputs() {
        let multipass = Multipass::new(RecordingI2c::default(), RecordingOutputs::new(2, 3));

        for voice in 0..3 {
            assert!(
                multipass.is_mapped(voice, DeviceFamily::CvGate, voice),
                "Voice {} should be mapped to its own output",
                voice
            );
        }
        assert!(!multipass.is_mapped(3, DeviceFamily::CvGate, 3), "Should not be mapped");
        assert!(!multipass.is_mapped(0, DeviceFamily::CvGate, 1), "Should not be mapped");
        assert!(!multipass.bus().is_leader(), "Should start as a follower");
    }

    #[test]
    fn default_routing_is_capped_at_the_family_size() {
        let multipass = Multipass::new(RecordingI2c::default(), RecordingOutputs::new(8, 8));

        assert!(multipass.is_mapped(3, DeviceFamily::CvGate, 3), "Should be mapped");
        assert!(!multipass.is_mapped(4, DeviceFamily::CvGate, 4), "Should not be mapped");
    }

    #[test]
    fn mute_and_mapping_are_independent() {
        let mut multipass = leader();
        multipass.map_voice(0, DeviceFamily::Er301, 0, true);

        multipass.mute_device(DeviceFamily::Er301, true);
        assert!(!multipass.is_mapped(0, DeviceFamily::Er301, 0), "Muted outputs should not be mapped");
        multipass.note_on(0, 100, 100);
        assert!(writes(&multipass).is_empty(), "Muted family should not be sent to");

        multipass.mute_device(DeviceFamily::Er301, false);
        assert!(multipass.is_mapped(0, DeviceFamily::Er301, 0), "Unmuting should restore the mapping");
    }

    #[test]
    fn out_of_range_operations_do_nothing() {
        let mut multipass = leader();

        multipass.map_voice(MAX_VOICES, DeviceFamily::Er301, 0, true);
        multipass.map_voice(0, DeviceFamily::JustFriends, 6, true);
        multipass.note_on(MAX_VOICES, 100, 100);
        multipass.note_off(MAX_VOICES);
        multipass.set_output_transpose(DeviceFamily::CvGate, 4, 100);
        multipass.set_output_mode(DeviceFamily::Er301, 0, TxoMode::Envelope);
        multipass.set_txo_mode(16, TxoMode::Envelope);
        multipass.set_er301_cv(100, 0);
        multipass.set_jf_gate(6, true);
        multipass.set_cv(4, 0);
        multipass.set_gate(4, true);
        multipass.set_txo_attack(16, 1);
        multipass.refresh_devices();

        assert!(writes(&multipass).is_empty(), "Should not have sent anything");
        assert!(multipass.outputs().writes.is_empty(), "Should not have written anything");
        assert!(!multipass.is_mapped(0, DeviceFamily::JustFriends, 6), "Should not be mapped");
        assert_eq!(0, multipass.parameters().transpose(DeviceFamily::CvGate, 4), "Expected left but got right");
    }

    #[test]
    fn zero_volume_is_note_off() {
        let mut on_zero = leader();
        let mut off = leader();
        for multipass in [&mut on_zero, &mut off] {
            multipass.map_voice(1, DeviceFamily::Er301, 3, true);
            multipass.map_voice(1, DeviceFamily::JustFriends, 0, true);
            multipass.map_voice(1, DeviceFamily::TxoNote, 2, true);
            multipass.map_voice(1, DeviceFamily::DistingEx, 4, true);
            multipass.map_voice(1, DeviceFamily::I2c2MidiCh, 1, true);
            multipass.note_on(1, 4000, 16383);
            multipass.bus_mut().i2c_mut().writes.clear();
        }

        on_zero.note_on(1, 4000, 0);
        off.note_off(1);

        assert!(!writes(&off).is_empty(), "Should have released the voice");
        assert_eq!(writes(&off), writes(&on_zero), "Expected left but got right");
        assert_eq!(
            on_zero.outputs().writes,
            off.outputs().writes,
            "Expected left but got right"
        );
    }

    #[test]
    fn fan_out_follows_family_then_output_order() {
        let mut multipass = leader();
        multipass.map_voice(0, DeviceFamily::JustFriends, 1, true);
        multipass.map_voice(0, DeviceFamily::Er301, 5, true);
        multipass.map_voice(0, DeviceFamily::Er301, 2, true);

        multipass.note_on(0, 8192, 16383);

        assert_eq!(
            vec![OutputWrite::Cv(0, 8192), OutputWrite::Gate(0, true)],
            multipass.outputs().writes,
            "Expected left but got right"
        );
        assert_eq!(
            &[
                (0x31, vec![0x11, 2, 0x13, 0x33]),
                (0x31, vec![0x11, 18, 0x3F, 0xFF]),
                (0x31, vec![0x00, 2, 0, 1]),
                (0x31, vec![0x00, 2, 0, 1]),
                (0x31, vec![0x11, 5, 0x13, 0x33]),
                (0x31, vec![0x11, 21, 0x3F, 0xFF]),
                (0x31, vec![0x00, 5, 0, 1]),
                (0x31, vec![0x00, 5, 0, 1]),
                (0x70, vec![8, 2, 0x13, 0x33, 0x3F, 0xFF]),
                (0x70, vec![1, 2, 1]),
            ][..],
            writes(&multipass),
            "Expected left but got right"
        );
    }

    #[test]
    fn note_off_uses_live_routing() {
        let mut multipass = leader();
        multipass.mute_device(DeviceFamily::CvGate, true);
        multipass.map_voice(0, DeviceFamily::Er301, 0, true);
        multipass.note_on(0, 8192, 16383);
        multipass.bus_mut().i2c_mut().writes.clear();

        multipass.map_voice(0, DeviceFamily::Er301, 0, false);
        multipass.map_voice(0, DeviceFamily::Er301, 1, true);
        multipass.note_off(0);

        assert_eq!(
            &[(0x31, vec![0x00, 1, 0, 0]), (0x31, vec![0x00, 1, 0, 0])][..],
            writes(&multipass),
            "Expected left but got right"
        );
    }

    #[test]
    fn transpose_and_volume_are_applied_per_output() {
        let mut multipass = leader();
        multipass.map_voice(0, DeviceFamily::TxoNote, 0, true);
        multipass.set_output_transpose_note(DeviceFamily::TxoNote, 0, Note::C0);
        multipass.set_output_max_volume(DeviceFamily::TxoNote, 0, 8192);
        multipass.set_output_transpose(DeviceFamily::CvGate, 0, -192);

        multipass.note_on(0, 0, 16383);

        assert_eq!(
            vec![OutputWrite::Cv(0, -192), OutputWrite::Gate(0, true)],
            multipass.outputs().writes,
            "Expected left but got right"
        );
        // 1638 + 4915 centering
        assert_eq!(
            &[
                (0x60, vec![0x60, 0, 0, 1]),
                (0x60, vec![0x41, 0, 0x19, 0x99]),
                (0x60, vec![0x11, 0, 0x20, 0x00]),
                (0x60, vec![0x6D, 0, 0, 1]),
            ][..],
            writes(&multipass),
            "Expected left but got right"
        );
    }

    #[test]
    fn txo_cv_gate_is_transposed() {
        let mut multipass = leader();
        multipass.mute_device(DeviceFamily::CvGate, true);
        multipass.map_voice(0, DeviceFamily::TxoCvGate, 0, true);
        multipass.set_output_transpose(DeviceFamily::TxoCvGate, 0, 100);

        multipass.note_on(0, 1000, 1);

        assert_eq!(
            (0x60, vec![0x11, 0, 0x04, 0x4C]),
            writes(&multipass)[2],
            "Expected left but got right"
        );
    }

    #[test]
    fn coalesced_txo_settings_flush_once() {
        let mut multipass = leader();

        multipass.set_txo_attack(0, 10);
        multipass.set_txo_attack(0, 15);
        multipass.refresh_devices();
        multipass.refresh_devices();

        assert_eq!(
            &[(0x60, vec![0x61, 0, 0, 15])][..],
            writes(&multipass),
            "Expected left but got right"
        );
    }

    #[test]
    fn output_modes_only_apply_to_telexo() {
        let mut multipass = leader();

        multipass.set_output_mode(DeviceFamily::TxoCvGate, 1, TxoMode::Envelope);
        multipass.set_output_mode(DeviceFamily::JustFriends, 1, TxoMode::Envelope);

        assert_eq!(
            &[(0x60, vec![0x60, 1, 0, 1])][..],
            writes(&multipass),
            "Expected left but got right"
        );
    }

    #[test]
    fn followers_stay_silent() {
        let mut multipass = Multipass::new(RecordingI2c::default(), RecordingOutputs::default());
        multipass.map_voice(0, DeviceFamily::Er301, 0, true);

        multipass.note_on(0, 8192, 16383);

        assert!(writes(&multipass).is_empty(), "Followers should not send");
        assert_eq!(
            vec![OutputWrite::Cv(0, 8192), OutputWrite::Gate(0, true)],
            multipass.outputs().writes,
            "Direct outputs should still play"
        );
    }

    #[test]
    fn leaving_the_bus_resets_just_friends() {
        let mut multipass = leader();
        multipass.set_jf_mode(true);

        multipass.set_as_i2c_follower(0x42);
        assert_eq!(
            BusRole::Follower { address: 0x42 },
            multipass.bus().role(),
            "Expected left but got right"
        );
        multipass.set_as_i2c_leader();
        multipass.set_jf_mode(true);

        assert_eq!(
            &[(0x70, vec![6, 1]), (0x70, vec![6, 1])][..],
            writes(&multipass),
            "Mode should have been forgotten while following"
        );
    }

    #[test]
    fn telexo_notes_set_up_the_envelope_after_taking_the_bus() {
        let mut multipass = Multipass::new(RecordingI2c::default(), RecordingOutputs::default());
        multipass.mute_device(DeviceFamily::CvGate, true);
        multipass.map_voice(0, DeviceFamily::TxoNote, 0, true);

        multipass.note_on(0, 1000, 16383);
        multipass.set_as_i2c_leader();
        multipass.note_on(0, 1000, 16383);

        assert_eq!(
            &[
                (0x60, vec![0x60, 0, 0, 1]),
                (0x60, vec![0x41, 0, 0x17, 0x1B]),
                (0x60, vec![0x11, 0, 0x3F, 0xFF]),
                (0x60, vec![0x6D, 0, 0, 1]),
            ][..],
            writes(&multipass),
            "Expected left but got right"
        );
    }

    #[test]
    fn note_helpers() {
        let mut multipass = leader();

        multipass.note_on_note(0, Note::C4, 100);
        multipass.note(0, 0, 0, false);
        multipass.note(1, 1638, 100, true);

        assert_eq!(
            vec![
                OutputWrite::Cv(0, 8192),
                OutputWrite::Gate(0, true),
                OutputWrite::Gate(0, false),
                OutputWrite::Cv(1, 1638),
                OutputWrite::Gate(1, true),
            ],
            multipass.outputs().writes,
            "Expected left but got right"
        );
        assert_eq!(8192, multipass.last_pitch(0), "Expected left but got right");
    }

    #[test]
    fn raw_setters() {
        let mut multipass = leader();

        multipass.set_cv(2, 300);
        multipass.set_gate(3, true);
        multipass.reset_outputs();
        multipass.set_txo_cv(0, 5);
        multipass.set_txo_gate(0, true);

        assert_eq!(
            vec![
                OutputWrite::Cv(2, 300),
                OutputWrite::Gate(3, true),
                OutputWrite::Cv(0, 0),
                OutputWrite::Cv(1, 0),
                OutputWrite::Cv(2, 0),
                OutputWrite::Cv(3, 0),
                OutputWrite::Gate(0, false),
                OutputWrite::Gate(1, false),
                OutputWrite::Gate(2, false),
                OutputWrite::Gate(3, false),
            ],
            multipass.outputs().writes,
            "Expected left but got right"
        );
        assert_eq!(
            &[
                (0x60, vec![0x60, 0, 0, 0]),
                (0x60, vec![0x41, 0, 0, 0]),
                (0x60, vec![0x11, 0, 0, 5]),
                (0x60, vec![0x6D, 0, 0, 0]),
                (0x60, vec![0x00, 0, 0, 1]),
            ][..],
            writes(&multipass),
            "Expected left but got right"
        );
    }
}
