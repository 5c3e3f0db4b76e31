//! Conversions between MIDI [`Note`]s and pitch values.
//!
//! A pitch is a signed 14-bit-ish quantity spanning -16384 (-10V) to [`MAX_LEVEL`] (+10V), which is what the module's
//! DACs and most of the supported I2C devices expect. At one volt per octave, a semitone is 16384 / 120 units.

use measurements::Voltage;
use wmidi::{Note, U7};

/// The maximum pitch, volume, or level value (+10V for pitches).
pub const MAX_LEVEL: i16 = 16383;

/// The minimum pitch value (-10V).
pub const MIN_PITCH: i16 = -16384;

/// Full scale of a pitch value in either direction.
const FULL_SCALE: i32 = 16384;

/// Highest MIDI note number.
const HIGHEST_NOTE: i32 = 127;

/// Ten octaves of twelve semitones fit in [`FULL_SCALE`].
const SEMITONES_PER_FULL_SCALE: i32 = 120;

/// Returns the pitch which plays `note` on a 1V/octave input, with [`Note::CMinus1`] at 0V.
///
/// C9 and above cannot be represented and are clamped to [`MAX_LEVEL`].
pub fn note_to_pitch(note: Note) -> i16 {
    // twice the resolution, then halve while rounding
    let doubled = i32::from(u8::from(note)) * FULL_SCALE * 2 / SEMITONES_PER_FULL_SCALE;
    let pitch = (doubled >> 1) + (doubled & 1);
    pitch.min(i32::from(MAX_LEVEL)) as i16
}

/// Returns the number of semitones above 0V that `pitch` is closest to. Negative for negative pitches.
pub(crate) fn semitones(pitch: i16) -> i32 {
    let doubled = (i32::from(pitch) * SEMITONES_PER_FULL_SCALE * 2).div_euclid(FULL_SCALE);
    (doubled >> 1) + (doubled & 1)
}

/// Returns the [`Note`] closest to `pitch`; the inverse of [`note_to_pitch`].
///
/// Pitches below 0V map to the lowest MIDI note.
pub fn pitch_to_note(pitch: i16) -> Note {
    let note = semitones(pitch).clamp(0, HIGHEST_NOTE);
    Note::from(U7::from_u8_lossy(note as u8))
}

/// Returns the voltage a pitch value represents on a ±10V output.
pub fn pitch_to_voltage(pitch: i16) -> Voltage {
    Voltage::from_volts(f64::from(pitch) * 10.0 / f64::from(FULL_SCALE))
}
