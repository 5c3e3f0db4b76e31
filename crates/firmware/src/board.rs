//! The Nucleo board's side of the [`CvGateOutputs`] and [`Peripherals`] seams.

use embassy_stm32::{
    dac::{DacCh1, DacCh2, Value},
    gpio::{Input, Output},
    mode::Async,
    peripherals::DAC1,
};
use embassy_sync::blocking_mutex::raw::RawMutex;
use measurements::Voltage;
use multipass_lib::{
    events::{Event, EventQueue, usb_midi_events},
    io::CvGateOutputs,
    pitch::pitch_to_voltage,
    scheduler::Subsystem,
};

use crate::midi;

/// The number of gate outputs wired to GPIO pins.
pub const GATE_COUNT: usize = 4;

/// CV on the two DAC channels, gates on GPIO pins.
pub struct NucleoOutputs {
    dac_ch1: DacCh1<'static, DAC1, Async>,
    dac_ch2: DacCh2<'static, DAC1, Async>,
    gates: [Output<'static>; GATE_COUNT],
}

impl NucleoOutputs {
    pub fn new(
        dac_ch1: DacCh1<'static, DAC1, Async>,
        dac_ch2: DacCh2<'static, DAC1, Async>,
        gates: [Output<'static>; GATE_COUNT],
    ) -> Self {
        Self {
            dac_ch1,
            dac_ch2,
            gates,
        }
    }
}

/// The output amplifier scales the DAC's full range to 0-10V.
const FULL_SCALE_VOLTS: f64 = 10.0;

/// Converts a voltage to a 12-bit DAC value. The outputs can't go below 0V, so negative voltages are clamped.
fn voltage_to_dac_value(voltage: Voltage) -> Value {
    let fraction = voltage.as_volts().clamp(0.0, FULL_SCALE_VOLTS) / FULL_SCALE_VOLTS;
    // truncating is close enough at this resolution
    Value::Bit12Right((fraction * 4095.0) as u16)
}

impl CvGateOutputs for NucleoOutputs {
    fn cv_output_count(&self) -> usize {
        2
    }

    fn gate_output_count(&self) -> usize {
        GATE_COUNT
    }

    fn write_cv(&mut self, output: usize, value: i16) {
        let value = voltage_to_dac_value(pitch_to_voltage(value));
        match output {
            0 => self.dac_ch1.set(value),
            _ => self.dac_ch2.set(value),
        }
    }

    fn write_gate(&mut self, output: usize, high: bool) {
        if high {
            self.gates[output].set_high();
        } else {
            self.gates[output].set_low();
        }
    }
}

/// Inputs polled by the run loop: the user button and buffered USB-MIDI.
pub struct Board {
    button: Input<'static>,
    pressed: bool,
}

impl Board {
    pub fn new(button: Input<'static>) -> Self {
        Self { button, pressed: false }
    }
}

impl multipass_lib::runtime::Peripherals for Board {
    fn is_active(&self, subsystem: Subsystem) -> bool {
        match subsystem {
            Subsystem::Inputs | Subsystem::DeviceRefresh => true,
            Subsystem::Midi => midi::is_connected(),
            // no knobs, CV inputs, or USB host port on this board
            Subsystem::Adc | Subsystem::Hid => false,
        }
    }

    fn poll<M: RawMutex, const N: usize>(&mut self, subsystem: Subsystem, events: &EventQueue<M, N>) {
        match subsystem {
            Subsystem::Inputs => {
                // the Nucleo's user button reads high while held
                let pressed = self.button.is_high();
                if pressed != self.pressed {
                    self.pressed = pressed;
                    events.post(Event::ButtonPressed { index: 0, pressed });
                }
            }
            Subsystem::Midi => {
                while let Ok(packet) = midi::PACKETS.try_receive() {
                    for event in usb_midi_events(&packet) {
                        events.post(event);
                    }
                }
            }
            _ => {}
        }
    }
}
