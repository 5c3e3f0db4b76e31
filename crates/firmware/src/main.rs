//! Multipass firmware for the [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html),
//! built on [Embassy](https://embassy.dev).
//!
//! The board stands in for a eurorack control module: its two DAC channels are CV outputs, four GPIO pins are gate
//! outputs, I2C1 leads a bus of expanders (ER-301, Just Friends, TELEXo, disting EX, i2c2midi), and USB provides
//! MIDI input. Everything musical happens in [`multipass_lib`]; this crate only wires hardware to it and runs the
//! loop.
//!
//! Tasks:
//! - `usb_task` runs the USB device.
//! - `midi_task` buffers incoming USB-MIDI packets for the run loop to poll.
//! - `run_loop` owns the [`Runtime`] and steps it forever, yielding between steps.

#![no_std]
#![no_main]

mod board;
mod control;
mod midi;

use crate::{
    board::{Board, NucleoOutputs},
    control::Controller,
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_stm32::{
    Config, bind_interrupts,
    dac::Dac,
    gpio::{Input, Level, Output, Pull, Speed},
    i2c::{self, I2c},
    mode::Blocking,
    peripherals,
    time::Hertz,
    usb,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use embassy_usb::{Builder, UsbDevice, class::midi::MidiClass};
use multipass_lib::{
    configuration::Config as RuntimeConfig, events::EventQueue, multipass::Multipass, runtime::Runtime,
};
use static_cell::StaticCell;

use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;
type I2cBus = I2c<'static, Blocking, i2c::mode::Master>;

/// Capacity of the event queue shared by drivers and the run loop.
const EVENT_QUEUE_SIZE: usize = 64;

/// Events posted by drivers and timers, consumed by the run loop.
static EVENTS: EventQueue<CriticalSectionRawMutex, EVENT_QUEUE_SIZE> = EventQueue::new();

type NucleoRuntime = Runtime<'static, I2cBus, NucleoOutputs, CriticalSectionRawMutex, EVENT_QUEUE_SIZE>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Multipass");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // USB OTG FS needs 48MHz, which comes from the main PLL's Q output (RM0410 section 5.2)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut usb_config = embassy_stm32::usb::Config::default();

    // the Nucleo's USB port cannot power the board (UM1974 section 6.10), so the device is self-powered and must
    // detect VBUS
    usb_config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        usb_config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    let vendor_id = 0x1209;
    let product_id = 0x3232;

    let mut usb_config = embassy_usb::Config::new(vendor_id, product_id);
    usb_config.manufacturer = Some("Pawpaw Works");
    usb_config.product = Some("Multipass");
    usb_config.self_powered = true;
    usb_config.max_power = 0;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );
    let class = MidiClass::new(&mut builder, 0, 1, 64);
    let usb = builder.build();

    // DAC channel 1 outputs on PA4, channel 2 on PA5 (RM0410)
    let (dac_ch1, dac_ch2) = Dac::new(p.DAC1, p.DMA1_CH5, p.DMA1_CH6, p.PA4, p.PA5).split();
    let gates = [
        Output::new(p.PG0, Level::Low, Speed::Low),
        Output::new(p.PG1, Level::Low, Speed::Low),
        Output::new(p.PF9, Level::Low, Speed::Low),
        Output::new(p.PF7, Level::Low, Speed::Low),
    ];
    let outputs = NucleoOutputs::new(dac_ch1, dac_ch2, gates);

    // I2C1 on the Arduino header's SCL/SDA pins
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = Hertz(400_000);
    let i2c = I2c::new_blocking(p.I2C1, p.PB8, p.PB9, i2c_config);

    let board = Board::new(Input::new(p.PC13, Pull::None));
    let controller = Controller::new(Output::new(p.PB14, Level::Low, Speed::Low));

    let runtime = Runtime::new(Multipass::new(i2c, outputs), &RuntimeConfig::default(), &EVENTS);

    unwrap!(spawner.spawn(usb_task(usb)));
    unwrap!(spawner.spawn(midi::midi_task(class, &EVENTS)));
    unwrap!(spawner.spawn(run_loop(runtime, controller, board)));
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// Steps the runtime forever, yielding to the other tasks between steps.
#[embassy_executor::task]
async fn run_loop(mut runtime: NucleoRuntime, mut controller: Controller, mut board: Board) -> ! {
    runtime.initialize(Instant::now(), &mut controller);
    loop {
        runtime.step(Instant::now(), &mut controller, &mut board);
        yield_now().await;
    }
}
