//! A small application which plays MIDI through the engine, so the board is useful on its own.

use defmt::*;
use embassy_stm32::gpio::Output;
use embedded_hal::i2c::I2c;
use multipass_lib::{
    devices::DeviceFamily,
    events::Event,
    io::CvGateOutputs,
    runtime::{Context, Control},
};
use wmidi::U7;

/// Timer slot driving the heartbeat LED.
const HEARTBEAT: u8 = 0;

const HEARTBEAT_PERIOD_MS: u16 = 500;

/// Plays MIDI channel `n` on voice `n`, toggles the direct outputs' mute from the user button, and blinks an LED so
/// it's obvious the run loop is alive.
pub struct Controller {
    led: Output<'static>,
    muted: bool,
}

impl Controller {
    pub fn new(led: Output<'static>) -> Self {
        Self { led, muted: false }
    }
}

/// Spreads a MIDI velocity over the engine's volume range.
fn velocity_to_volume(velocity: U7) -> u16 {
    u16::from(u8::from(velocity)) << 7
}

impl<I: I2c, O: CvGateOutputs> Control<I, O> for Controller {
    fn init(&mut self, ctx: &mut Context<'_, I, O>) {
        ctx.multipass.set_as_i2c_leader();
        ctx.multipass.reset_outputs();
        ctx.add_timed_event(usize::from(HEARTBEAT), HEARTBEAT_PERIOD_MS, true);
    }

    fn process_event(&mut self, event: Event, ctx: &mut Context<'_, I, O>) {
        match event {
            Event::TimedEvent { index: HEARTBEAT } => self.led.toggle(),
            Event::MidiNote {
                channel,
                note,
                velocity,
                on,
            } => {
                let voice = usize::from(channel.index());
                if on {
                    ctx.multipass.note_on_note(voice, note, velocity_to_volume(velocity));
                } else {
                    ctx.multipass.note_off(voice);
                }
            }
            Event::ButtonPressed { index: 0, pressed: true } => {
                self.muted = !self.muted;
                ctx.multipass.mute_device(DeviceFamily::CvGate, self.muted);
                if self.muted {
                    ctx.multipass.reset_outputs();
                }
            }
            Event::MidiConnected { connected } => info!("MIDI connected: {}", connected),
            _ => {}
        }
    }
}
