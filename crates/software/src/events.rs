//! Everything the outside world can tell an application, and the queue which carries it.
//!
//! Drivers (running in their own tasks or interrupt handlers) post events; the run loop takes them out one at a time
//! and hands them to the application's [`Control`](crate::runtime::Control).

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;
use tinyvec::ArrayVec;
use wmidi::{Channel as MidiChannel, ControlFunction, MidiMessage, Note, U7};

/// The most bytes an event can carry.
pub const MAX_EVENT_DATA: usize = 16;

/// Bytes received from another leader while following on the I2C bus.
pub type I2cData = ArrayVec<[u8; MAX_EVENT_DATA]>;

/// The wire value identifying each kind of [`Event`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum EventTag {
    TimedEvent = 0x00,
    MainClockReceived = 0x01,
    MainClockSwitched = 0x02,
    GateReceived = 0x03,
    FrontButtonPressed = 0x10,
    FrontButtonHeld = 0x11,
    ButtonPressed = 0x12,
    I2cReceived = 0x30,
    GridConnected = 0x40,
    GridKeyPressed = 0x41,
    GridKeyHeld = 0x42,
    ArcConnected = 0x43,
    ArcEncoderFine = 0x44,
    ArcEncoderCoarse = 0x45,
    MidiConnected = 0x50,
    MidiNote = 0x51,
    MidiCc = 0x52,
    MidiAftertouch = 0x53,
    KeyboardConnected = 0x60,
    KeyboardKey = 0x61,
    ShnthConnected = 0x62,
    ShnthBar = 0x63,
    ShnthAntenna = 0x64,
    ShnthButton = 0x65,
}

/// Something that happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A timer started through [`Context::add_timed_event`](crate::runtime::Context::add_timed_event) fired.
    TimedEvent {
        /// The timer's slot.
        index: u8,
    },
    /// A clock pulse arrived.
    MainClockReceived {
        /// True if the pulse came from the clock input rather than the internal clock.
        external: bool,
        /// True on the rising edge.
        phase: bool,
    },
    /// A cable was patched into or pulled out of the clock input.
    MainClockSwitched {
        /// True if a cable is now patched.
        external: bool,
    },
    /// A gate input changed.
    GateReceived {
        /// The input.
        index: u8,
        /// True if the gate went high.
        high: bool,
    },
    /// The front panel button changed.
    FrontButtonPressed {
        /// True if it went down.
        pressed: bool,
    },
    /// The front panel button has been held down.
    FrontButtonHeld,
    /// A panel button changed.
    ButtonPressed {
        /// The button.
        index: u8,
        /// True if it went down.
        pressed: bool,
    },
    /// Another bus leader wrote to this module.
    I2cReceived(I2cData),
    /// A grid was plugged in or removed.
    GridConnected {
        /// True if plugged in.
        connected: bool,
    },
    /// A grid key changed.
    GridKeyPressed {
        /// Column.
        x: u8,
        /// Row.
        y: u8,
        /// True if it went down.
        pressed: bool,
    },
    /// A grid key has been held down.
    GridKeyHeld {
        /// Column.
        x: u8,
        /// Row.
        y: u8,
    },
    /// An arc was plugged in or removed.
    ArcConnected {
        /// True if plugged in.
        connected: bool,
    },
    /// An arc ring turned, reported at full resolution.
    ArcEncoderFine {
        /// The ring.
        encoder: u8,
        /// Signed movement since the last report.
        delta: i8,
    },
    /// An arc ring turned far enough to count as one step.
    ArcEncoderCoarse {
        /// The ring.
        encoder: u8,
        /// True if the step was clockwise.
        clockwise: bool,
    },
    /// A MIDI device was plugged in or removed.
    MidiConnected {
        /// True if plugged in.
        connected: bool,
    },
    /// A MIDI note started or stopped.
    MidiNote {
        /// The channel it arrived on.
        channel: MidiChannel,
        /// The note.
        note: Note,
        /// The velocity (0 for note offs).
        velocity: U7,
        /// False for note offs, including note ons with velocity 0.
        on: bool,
    },
    /// A MIDI controller changed.
    MidiCc {
        /// The channel it arrived on.
        channel: MidiChannel,
        /// The controller.
        controller: ControlFunction,
        /// The new value.
        value: U7,
    },
    /// Polyphonic key pressure changed.
    MidiAftertouch {
        /// The channel it arrived on.
        channel: MidiChannel,
        /// The key.
        note: Note,
        /// The new pressure.
        value: U7,
    },
    /// A USB keyboard was plugged in or removed.
    KeyboardConnected {
        /// True if plugged in.
        connected: bool,
    },
    /// A USB keyboard key changed.
    KeyboardKey {
        /// The HID modifier byte.
        modifier: u8,
        /// The HID usage code.
        key: u8,
        /// True if it went down.
        pressed: bool,
    },
    /// A shnth was plugged in or removed.
    ShnthConnected {
        /// True if plugged in.
        connected: bool,
    },
    /// Pressure on a shnth bar changed.
    ShnthBar {
        /// The bar.
        bar: u8,
        /// Pressure, 0 to 255.
        pressure: u8,
    },
    /// Pressure on a shnth antenna changed.
    ShnthAntenna {
        /// The antenna.
        antenna: u8,
        /// Pressure, 0 to 255.
        pressure: u8,
    },
    /// A shnth button changed.
    ShnthButton {
        /// The button.
        index: u8,
        /// True if it went down.
        pressed: bool,
    },
    /// A tag this firmware doesn't know. Never delivered to applications.
    Unknown {
        /// The tag as received.
        tag: u8,
    },
}

fn channel(byte: u8) -> MidiChannel {
    MidiChannel::from_index(byte & 0x0F).unwrap_or(MidiChannel::Ch1)
}

fn u7(byte: u8) -> U7 {
    U7::from_u8_lossy(byte)
}

impl Event {
    /// Decodes an event from its wire tag and payload. Bytes missing from the payload read as 0.
    pub fn from_wire(tag: u8, data: &[u8]) -> Self {
        let byte = |i: usize| data.get(i).copied().unwrap_or(0);
        let flag = |i: usize| byte(i) != 0;

        let Some(tag) = EventTag::from_u8(tag) else {
            return Self::Unknown { tag };
        };
        match tag {
            EventTag::TimedEvent => Self::TimedEvent { index: byte(0) },
            EventTag::MainClockReceived => Self::MainClockReceived {
                external: flag(0),
                phase: flag(1),
            },
            EventTag::MainClockSwitched => Self::MainClockSwitched { external: flag(0) },
            EventTag::GateReceived => Self::GateReceived {
                index: byte(0),
                high: flag(1),
            },
            EventTag::FrontButtonPressed => Self::FrontButtonPressed { pressed: flag(0) },
            EventTag::FrontButtonHeld => Self::FrontButtonHeld,
            EventTag::ButtonPressed => Self::ButtonPressed {
                index: byte(0),
                pressed: flag(1),
            },
            EventTag::I2cReceived => Self::I2cReceived(data.iter().take(MAX_EVENT_DATA).copied().collect()),
            EventTag::GridConnected => Self::GridConnected { connected: flag(0) },
            EventTag::GridKeyPressed => Self::GridKeyPressed {
                x: byte(0),
                y: byte(1),
                pressed: flag(2),
            },
            EventTag::GridKeyHeld => Self::GridKeyHeld { x: byte(0), y: byte(1) },
            EventTag::ArcConnected => Self::ArcConnected { connected: flag(0) },
            EventTag::ArcEncoderFine => Self::ArcEncoderFine {
                encoder: byte(0),
                delta: byte(1) as i8,
            },
            EventTag::ArcEncoderCoarse => Self::ArcEncoderCoarse {
                encoder: byte(0),
                clockwise: flag(1),
            },
            EventTag::MidiConnected => Self::MidiConnected { connected: flag(0) },
            EventTag::MidiNote => Self::MidiNote {
                channel: channel(byte(0)),
                note: Note::from(u7(byte(1))),
                velocity: u7(byte(2)),
                on: flag(3),
            },
            EventTag::MidiCc => Self::MidiCc {
                channel: channel(byte(0)),
                controller: ControlFunction(u7(byte(1))),
                value: u7(byte(2)),
            },
            EventTag::MidiAftertouch => Self::MidiAftertouch {
                channel: channel(byte(0)),
                note: Note::from(u7(byte(1))),
                value: u7(byte(2)),
            },
            EventTag::KeyboardConnected => Self::KeyboardConnected { connected: flag(0) },
            EventTag::KeyboardKey => Self::KeyboardKey {
                modifier: byte(0),
                key: byte(1),
                pressed: flag(2),
            },
            EventTag::ShnthConnected => Self::ShnthConnected { connected: flag(0) },
            EventTag::ShnthBar => Self::ShnthBar {
                bar: byte(0),
                pressure: byte(1),
            },
            EventTag::ShnthAntenna => Self::ShnthAntenna {
                antenna: byte(0),
                pressure: byte(1),
            },
            EventTag::ShnthButton => Self::ShnthButton {
                index: byte(0),
                pressed: flag(1),
            },
        }
    }

    /// The wire tag of this event, or `None` for [`Event::Unknown`].
    pub fn tag(&self) -> Option<EventTag> {
        Some(match self {
            Self::TimedEvent { .. } => EventTag::TimedEvent,
            Self::MainClockReceived { .. } => EventTag::MainClockReceived,
            Self::MainClockSwitched { .. } => EventTag::MainClockSwitched,
            Self::GateReceived { .. } => EventTag::GateReceived,
            Self::FrontButtonPressed { .. } => EventTag::FrontButtonPressed,
            Self::FrontButtonHeld => EventTag::FrontButtonHeld,
            Self::ButtonPressed { .. } => EventTag::ButtonPressed,
            Self::I2cReceived(_) => EventTag::I2cReceived,
            Self::GridConnected { .. } => EventTag::GridConnected,
            Self::GridKeyPressed { .. } => EventTag::GridKeyPressed,
            Self::GridKeyHeld { .. } => EventTag::GridKeyHeld,
            Self::ArcConnected { .. } => EventTag::ArcConnected,
            Self::ArcEncoderFine { .. } => EventTag::ArcEncoderFine,
            Self::ArcEncoderCoarse { .. } => EventTag::ArcEncoderCoarse,
            Self::MidiConnected { .. } => EventTag::MidiConnected,
            Self::MidiNote { .. } => EventTag::MidiNote,
            Self::MidiCc { .. } => EventTag::MidiCc,
            Self::MidiAftertouch { .. } => EventTag::MidiAftertouch,
            Self::KeyboardConnected { .. } => EventTag::KeyboardConnected,
            Self::KeyboardKey { .. } => EventTag::KeyboardKey,
            Self::ShnthConnected { .. } => EventTag::ShnthConnected,
            Self::ShnthBar { .. } => EventTag::ShnthBar,
            Self::ShnthAntenna { .. } => EventTag::ShnthAntenna,
            Self::ShnthButton { .. } => EventTag::ShnthButton,
            Self::Unknown { .. } => return None,
        })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MidiNote {
                channel,
                note,
                velocity,
                on,
            } => defmt::write!(
                fmt,
                "MidiNote {{ channel: {}, note: {}, velocity: {}, on: {} }}",
                channel.number(),
                note.to_str(),
                u8::from(*velocity),
                on
            ),
            Self::I2cReceived(data) => defmt::write!(fmt, "I2cReceived({=[u8]})", data.as_slice()),
            Self::Unknown { tag } => defmt::write!(fmt, "Unknown {{ tag: {=u8:#x} }}", tag),
            other => match other.tag() {
                Some(tag) => defmt::write!(fmt, "{}", tag),
                None => defmt::write!(fmt, "?"),
            },
        }
    }
}

/// Turns USB-MIDI event packets into events. Packets that are truncated or carry other messages are skipped.
pub fn usb_midi_events(data: &[u8]) -> impl Iterator<Item = Event> + '_ {
    data.chunks(4).filter_map(|packet| {
        if packet.len() != 4 {
            error!("USB-MIDI Event Packets must always be 32 bits long");
            return None;
        }
        // the first byte is the packet header, which isn't of interest
        match MidiMessage::from_bytes(&packet[1..]).ok()? {
            MidiMessage::NoteOn(channel, note, velocity) => Some(Event::MidiNote {
                channel,
                note,
                velocity,
                on: u8::from(velocity) > 0,
            }),
            MidiMessage::NoteOff(channel, note, _) => Some(Event::MidiNote {
                channel,
                note,
                velocity: U7::MIN,
                on: false,
            }),
            MidiMessage::ControlChange(channel, controller, value) => Some(Event::MidiCc {
                channel,
                controller,
                value,
            }),
            MidiMessage::PolyphonicKeyPressure(channel, note, value) => Some(Event::MidiAftertouch {
                channel,
                note,
                value,
            }),
            _ => None,
        }
    })
}

/// A bounded, multi-producer queue of [`Event`]s with a single consumer (the run loop).
///
/// Posting never blocks: when the queue is full the event is dropped.
pub struct EventQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, Event, N>,
}

impl<M: RawMutex, const N: usize> EventQueue<M, N> {
    /// Creates an empty queue. `const` so it can live in a `static`.
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Adds `event` to the back of the queue. Returns false (and drops the event) if the queue is full.
    pub fn post(&self, event: Event) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!("Event queue full, dropping {}", event);
                false
            }
        }
    }

    /// Takes the oldest event out of the queue.
    pub fn next(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// The number of events waiting.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Returns true if no events are waiting.
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<M: RawMutex, const N: usize> Default for EventQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use num_traits::FromPrimitive;

    use super::*;

    #[test]
    fn decodes_payloads() {
        assert_eq!(
            Event::GridKeyPressed {
                x: 3,
                y: 7,
                pressed: true
            },
            Event::from_wire(0x41, &[3, 7, 1]),
            "Expected left but got right"
        );
        assert_eq!(
            Event::ArcEncoderFine { encoder: 2, delta: -3 },
            Event::from_wire(0x44, &[2, 0xFD]),
            "Expected left but got right"
        );
        assert_eq!(
            Event::MidiNote {
                channel: MidiChannel::Ch10,
                note: Note::C4,
                velocity: U7::from_u8_lossy(100),
                on: true
            },
            Event::from_wire(0x51, &[9, 60, 100, 1]),
            "Expected left but got right"
        );
        assert_eq!(Event::FrontButtonHeld, Event::from_wire(0x11, &[]), "Expected left but got right");
    }

    #[test]
    fn shnth_pressure_is_unsigned() {
        assert_eq!(
            Event::ShnthBar { bar: 1, pressure: 200 },
            Event::from_wire(0x63, &[1, 200]),
            "Expected left but got right"
        );
        assert_eq!(
            Event::ShnthAntenna {
                antenna: 0,
                pressure: 255
            },
            Event::from_wire(0x64, &[0, 255]),
            "Expected left but got right"
        );
    }

    #[test]
    fn missing_bytes_read_as_zero() {
        assert_eq!(
            Event::ButtonPressed {
                index: 4,
                pressed: false
            },
            Event::from_wire(0x12, &[4]),
            "Expected left but got right"
        );
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let event = Event::from_wire(0x20, &[1, 2]);

        assert_eq!(Event::Unknown { tag: 0x20 }, event, "Expected left but got right");
        assert_eq!(None, event.tag(), "Expected left but got right");
    }

    #[test]
    fn i2c_payloads_are_truncated() {
        let data: Vec<u8> = (0..20).collect();

        let Event::I2cReceived(received) = Event::from_wire(0x30, &data) else {
            panic!("Should have decoded an I2C event");
        };
        assert_eq!(&data[..16], received.as_slice(), "Expected left but got right");
    }

    #[test]
    fn tags_survive_decoding() {
        for tag in 0..=u8::MAX {
            if let Some(known) = EventTag::from_u8(tag) {
                assert_eq!(
                    Some(known),
                    Event::from_wire(tag, &[]).tag(),
                    "Expected left but got right"
                );
            }
        }
    }

    #[test]
    fn usb_midi_packets() {
        let data = [
            0x09, 0x90, 60, 100, // note on
            0x09, 0x91, 62, 0, // note on with velocity 0
            0x08, 0x80, 60, 64, // note off
            0x0B, 0xB0, 5, 90, // control change
            0x0A, 0xA0, 60, 30, // polyphonic key pressure
            0x0F, 0xF8, 0, 0, // clock, ignored
            0x09, 0x90, // truncated
        ];

        let events: Vec<Event> = usb_midi_events(&data).collect();

        assert_eq!(
            vec![
                Event::MidiNote {
                    channel: MidiChannel::Ch1,
                    note: Note::C4,
                    velocity: U7::from_u8_lossy(100),
                    on: true
                },
                Event::MidiNote {
                    channel: MidiChannel::Ch2,
                    note: Note::D4,
                    velocity: U7::MIN,
                    on: false
                },
                Event::MidiNote {
                    channel: MidiChannel::Ch1,
                    note: Note::C4,
                    velocity: U7::MIN,
                    on: false
                },
                Event::MidiCc {
                    channel: MidiChannel::Ch1,
                    controller: ControlFunction::PORTAMENTO_TIME,
                    value: U7::from_u8_lossy(90)
                },
                Event::MidiAftertouch {
                    channel: MidiChannel::Ch1,
                    note: Note::C4,
                    value: U7::from_u8_lossy(30)
                },
            ],
            events,
            "Expected left but got right"
        );
    }

    #[test]
    fn full_queues_drop() {
        let queue: EventQueue<CriticalSectionRawMutex, 2> = EventQueue::new();

        assert!(queue.post(Event::TimedEvent { index: 0 }), "Should have been queued");
        assert!(queue.post(Event::TimedEvent { index: 1 }), "Should have been queued");
        assert!(!queue.post(Event::TimedEvent { index: 2 }), "Should have been dropped");
        assert_eq!(2, queue.len(), "Expected left but got right");

        assert_eq!(Some(Event::TimedEvent { index: 0 }), queue.next(), "Expected left but got right");
        assert_eq!(Some(Event::TimedEvent { index: 1 }), queue.next(), "Expected left but got right");
        assert_eq!(None, queue.next(), "Expected left but got right");
        assert!(queue.is_empty(), "Should be empty");
    }
}
