//! Which outputs each voice plays on.

use crate::devices::DeviceFamily;

/// The number of voices an application can address.
pub const MAX_VOICES: usize = 32;

/// A bitmap with one bit per (voice, family, output).
///
/// Muting is not part of the map; see [`OutputParameters`](crate::parameters::OutputParameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceMap {
    bits: [[u32; DeviceFamily::COUNT]; MAX_VOICES],
}

impl Default for VoiceMap {
    fn default() -> Self {
        Self {
            bits: [[0; DeviceFamily::COUNT]; MAX_VOICES],
        }
    }
}

impl VoiceMap {
    /// Routes `voice` to (or away from) `output`. Ignored if either is out of range.
    pub fn map(&mut self, voice: usize, family: DeviceFamily, output: usize, enabled: bool) {
        if voice >= MAX_VOICES || !family.contains(output) {
            debug!("ignoring map of voice {} to {} output {}", voice, family, output);
            return;
        }
        let bits = &mut self.bits[voice][family.index()];
        if enabled {
            *bits |= 1 << output;
        } else {
            *bits &= !(1 << output);
        }
    }

    /// Returns true when `voice` is routed to `output`, regardless of mute.
    pub fn is_set(&self, voice: usize, family: DeviceFamily, output: usize) -> bool {
        voice < MAX_VOICES && family.contains(output) && self.bits[voice][family.index()] & (1 << output) != 0
    }

    /// The outputs of `family` that `voice` is routed to, in ascending order.
    pub fn outputs(&self, voice: usize, family: DeviceFamily) -> impl Iterator<Item = usize> + use<> {
        let mut bits = if voice < MAX_VOICES {
            self.bits[voice][family.index()]
        } else {
            0
        };
        core::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let output = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(output)
        })
    }
}
