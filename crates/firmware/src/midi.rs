//! USB-MIDI input.
//!
//! Packets are buffered as they arrive and decoded when the run loop polls [`Subsystem::Midi`], so MIDI is handled
//! at the same cadence as every other input.
//!
//! [`Subsystem::Midi`]: multipass_lib::scheduler::Subsystem::Midi

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{panic, *};
use embassy_stm32::{peripherals, usb};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_usb::{class::midi::MidiClass, driver::EndpointError};
use multipass_lib::events::{Event, EventQueue};

/// A USB-MIDI event packet: a header byte followed by a three-byte MIDI message.
pub type Packet = [u8; 4];

/// Packets received since the last MIDI poll.
pub static PACKETS: Channel<CriticalSectionRawMutex, Packet, 64> = Channel::new();

/// Whether a USB host is connected.
pub static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Returns true while a USB host is connected.
pub fn is_connected() -> bool {
    CONNECTED.load(Ordering::Relaxed)
}

#[embassy_executor::task]
pub async fn midi_task(
    mut class: MidiClass<'static, usb::Driver<'static, peripherals::USB_OTG_FS>>,
    events: &'static EventQueue<CriticalSectionRawMutex, { crate::EVENT_QUEUE_SIZE }>,
) -> ! {
    loop {
        class.wait_connection().await;
        info!("USB connected");
        set_connected(true, events);
        let _ = buffer_packets(&mut class).await;
        set_connected(false, events);
        info!("USB disconnected");
    }
}

fn set_connected<const N: usize>(connected: bool, events: &EventQueue<CriticalSectionRawMutex, N>) {
    CONNECTED.store(connected, Ordering::Relaxed);
    events.post(Event::MidiConnected { connected });
}

#[doc(hidden)]
struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}

/// Splits whatever arrives over USB into packets and queues them, dropping packets the run loop hasn't kept up with.
async fn buffer_packets<'d, T: usb::Instance + 'd>(
    class: &mut MidiClass<'d, usb::Driver<'d, T>>,
) -> Result<(), Disconnected> {
    let mut buf = [0; 64];
    loop {
        let n = class.read_packet(&mut buf).await?;
        for chunk in buf[..n].chunks_exact(4) {
            let mut packet: Packet = [0; 4];
            packet.copy_from_slice(chunk);
            if PACKETS.try_send(packet).is_err() {
                warn!("MIDI buffer full, dropping packet");
            }
        }
    }
}
