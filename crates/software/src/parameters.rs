//! Per-output settings that shape what the encoders send.

use wmidi::Note;

use crate::devices::DeviceFamily;
use crate::pitch::{MAX_LEVEL, note_to_pitch};

/// Transpose, maximum volume, and mute settings for every output of every [`DeviceFamily`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutputParameters {
    transpose: [[i16; DeviceFamily::MAX_OUTPUTS]; DeviceFamily::COUNT],
    max_volume: [[u16; DeviceFamily::MAX_OUTPUTS]; DeviceFamily::COUNT],
    muted: [bool; DeviceFamily::COUNT],
}

impl Default for OutputParameters {
    fn default() -> Self {
        Self {
            transpose: [[0; DeviceFamily::MAX_OUTPUTS]; DeviceFamily::COUNT],
            max_volume: [[MAX_LEVEL as u16; DeviceFamily::MAX_OUTPUTS]; DeviceFamily::COUNT],
            muted: [false; DeviceFamily::COUNT],
        }
    }
}

impl OutputParameters {
    /// The pitch offset added to every note sent to `output`. 0 for outputs that don't exist.
    pub fn transpose(&self, family: DeviceFamily, output: usize) -> i16 {
        if !family.contains(output) {
            return 0;
        }
        self.transpose[family.index()][output]
    }

    /// Sets the pitch offset of `output`. Ignored if the output doesn't exist.
    pub fn set_transpose(&mut self, family: DeviceFamily, output: usize, offset: i16) {
        if !family.contains(output) {
            debug!("ignoring transpose for {} output {}", family, output);
            return;
        }
        self.transpose[family.index()][output] = offset;
    }

    /// Sets the offset of `output` so that notes are shifted by `note`'s distance from [`Note::CMinus1`].
    pub fn set_transpose_note(&mut self, family: DeviceFamily, output: usize, note: Note) {
        self.set_transpose(family, output, note_to_pitch(note));
    }

    /// The loudest `output` will play.
    pub fn max_volume(&self, family: DeviceFamily, output: usize) -> u16 {
        if !family.contains(output) {
            return 0;
        }
        self.max_volume[family.index()][output]
    }

    /// Sets the loudest `output` will play, clamped to [`MAX_LEVEL`].
    ///
    /// Ignored for outputs that don't exist and for families without a volume dimension.
    pub fn set_max_volume(&mut self, family: DeviceFamily, output: usize, volume: u16) {
        if !family.contains(output) || !family.has_volume() {
            debug!("ignoring max volume for {} output {}", family, output);
            return;
        }
        self.max_volume[family.index()][output] = volume.min(MAX_LEVEL as u16);
    }

    /// Scales `volume` (0 to [`MAX_LEVEL`]) by the maximum of `output`.
    pub fn scaled_volume(&self, family: DeviceFamily, output: usize, volume: u16) -> u16 {
        let volume = u32::from(volume.min(MAX_LEVEL as u16));
        let max = u32::from(self.max_volume(family, output));
        (volume * max / MAX_LEVEL as u32) as u16
    }

    /// Returns true if every output of `family` is silenced.
    pub fn is_muted(&self, family: DeviceFamily) -> bool {
        self.muted[family.index()]
    }

    /// Silences or restores `family` without changing any routing.
    pub fn set_muted(&mut self, family: DeviceFamily, muted: bool) {
        self.muted[family.index()] = muted;
    }
}
