//! DTD - Remote detector (DD) firmware
//!
//! Answers POLL and SETID requests from the terminal over the 433 MHz
//! serial radio, reporting the state of its presence input.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dtd_core::config::DetectorConfig;
use dtd_core::detector::{resolve_identity, FlashIdentityStore, Responder, StrapPins};
use dtd_core::traits::PinPresence;
use dtd_core::watchdog::WatchdogState;
use dtd_hal::{OutputPin, UartConfig};
use dtd_hal_rp2040::flash::Rp2040FlashStorage;
use dtd_hal_rp2040::gpio::{Rp2040Input, Rp2040Output};
use dtd_hal_rp2040::reset::BlinkReset;
use dtd_hal_rp2040::time::{now_ms, EmbassyClock};
use dtd_hal_rp2040::uart::{to_embassy_config, RadioUart};

use crate::led::SharedLed;

mod led;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Main loop progress, checked by the watchdog task
pub static WATCHDOG: WatchdogState = WatchdogState::new();

static WATCHDOG_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    WATCHDOG_EXECUTOR.on_interrupt()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("DTD detector starting...");

    let p = embassy_rp::init(Default::default());
    let config = DetectorConfig::with_static_id(option_env!("DTD_DETECTOR_ID"));

    let led = SharedLed::install(Output::new(p.PIN_25, Level::Low));

    // Radio module enable
    let mut radio_enable = Rp2040Output::new(Output::new(p.PIN_2, Level::High));

    let straps = StrapPins::new(
        Rp2040Input::new(Input::new(p.PIN_18, Pull::Up)),
        Rp2040Input::new(Input::new(p.PIN_19, Pull::Up)),
        Rp2040Input::new(Input::new(p.PIN_21, Pull::Up)),
    );
    let mut store = FlashIdentityStore::new(Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0));
    let (id, source) = resolve_identity(config.static_id.as_ref(), &mut store, || {
        straps.read_code()
    });
    info!("Detector id {} (from {})", id.as_str(), source);

    let sensor = PinPresence::new(Rp2040Input::new(Input::new(p.PIN_15, Pull::Down)), true);

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 128]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        to_embassy_config(&UartConfig::default()),
    );
    let radio = RadioUart::new(uart);

    let detector = Responder::new(id, sensor, led, store, EmbassyClock);

    WATCHDOG.feed(now_ms());
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = WATCHDOG_EXECUTOR.start(interrupt::SWI_IRQ_1);
    unwrap!(high.spawn(tasks::watchdog_task(
        config.watchdog_timeout_ms,
        BlinkReset::new(led)
    )));

    unwrap!(spawner.spawn(tasks::responder_task(
        detector,
        radio,
        config.loop_interval_ms,
        config.stats_every_loops
    )));

    info!("All tasks spawned, detector running");

    // Keeps the radio enable line driven
    loop {
        Timer::after_secs(60).await;
        radio_enable.set_high();
        trace!("Main heartbeat");
    }
}
