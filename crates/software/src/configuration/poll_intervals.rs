use embassy_time::Duration;

/// How often the [`Scheduler`](crate::scheduler::Scheduler) runs each periodic subsystem.
///
/// A subsystem runs once more than its interval has elapsed since it last ran, so these are minimum gaps rather than
/// exact periods; a slow event handler delays every subsystem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollIntervals {
    /// Sampling of knobs and CV inputs.
    pub adc: Duration,
    /// Scan of buttons and gate inputs.
    pub inputs: Duration,
    /// Frame read from an attached HID device (keyboard, shnth).
    pub hid: Duration,
    /// Read of the incoming MIDI stream.
    pub midi: Duration,
    /// Flush of coalesced device parameter writes (see [`Multipass::refresh_devices`](crate::multipass::Multipass::refresh_devices)).
    pub device_refresh: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            adc: Duration::from_millis(100),
            inputs: Duration::from_millis(50),
            hid: Duration::from_millis(48),
            midi: Duration::from_millis(8),
            device_refresh: Duration::from_millis(50),
        }
    }
}
