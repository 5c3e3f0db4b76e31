/// The two operating states of a TELEXo output.
///
/// In oscillator mode the output is a free-running oscillator (or a plain CV source); in envelope mode the oscillator
/// is shaped by the output's envelope, so it only sounds while the envelope is triggered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxoMode {
    /// Free-running; starts at waveform 0 (sine) when selected.
    Oscillator,
    /// Gated by the output's envelope.
    Envelope,
}

impl From<u8> for TxoMode {
    /// 0 selects [`TxoMode::Oscillator`]; anything else selects [`TxoMode::Envelope`].
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Oscillator,
            _ => Self::Envelope,
        }
    }
}
