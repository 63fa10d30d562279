//! DTD - Test terminal (TA) firmware
//!
//! Polls the configured detectors over the 433 MHz serial radio (or a
//! simulated link), logs their state and supervises its own main loop
//! with an interrupt-priority watchdog.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dtd_core::config::{has_critical, parse_terminal_config, validate, TerminalConfig};
use dtd_core::link::{RadioLink, RandomSimulation, SerialTransport};
use dtd_core::terminal::TerminalApp;
use dtd_hal::UartConfig;
use dtd_hal_rp2040::flash::Rp2040FlashStorage;
use dtd_hal_rp2040::gpio::{RadioModePin, Rp2040Output};
use dtd_hal_rp2040::reset::BlinkReset;
use dtd_hal_rp2040::time::{now_ms, EmbassyClock};
use dtd_hal_rp2040::uart::{to_embassy_config, RadioUart};

use crate::channels::WATCHDOG;
use crate::config::{log_config_summary, ConfigPersistence};
use crate::render::LogRenderer;

mod channels;
mod config;
mod render;
mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit terminal.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../terminal.toml");

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Executor for the watchdog checker; preempts the main loop
static WATCHDOG_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    WATCHDOG_EXECUTOR.on_interrupt()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("DTD terminal starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config(Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0)).await;

    if let Err(issues) = validate(&config) {
        for issue in issues.iter() {
            if issue.is_critical() {
                error!("Config: {}", issue);
            } else {
                warn!("Config: {}", issue);
            }
        }
        if has_critical(&issues) {
            error!("Critical configuration issues, terminal halted");
            loop {
                Timer::after_secs(60).await;
            }
        }
    }

    info!("Simulation mode: {}", config.simulate);
    info!("Debug mode: {}", config.debug);

    // GT38 SET high: transparent run mode
    let mut radio_mode = RadioModePin::new(Output::new(p.PIN_4, Level::High));
    radio_mode.set_run_mode();

    let tx_buf = TX_BUF.init([0u8; 128]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        to_embassy_config(&UartConfig::default()),
    );
    let transport = SerialTransport::new(RadioUart::new(uart));
    info!("Radio UART initialized");

    let link = RadioLink::new(
        Some(transport),
        EmbassyClock,
        RandomSimulation::new(config.rng_seed),
        &config,
    );
    let mut app = TerminalApp::new(link, LogRenderer::new(), &WATCHDOG, &config);
    app.link_mut().probe_hardware();

    // Watchdog first, so a stall anywhere below is caught
    if config.watchdog.enabled {
        WATCHDOG.feed(now_ms());
        interrupt::SWI_IRQ_1.set_priority(Priority::P2);
        let high = WATCHDOG_EXECUTOR.start(interrupt::SWI_IRQ_1);
        let led = Rp2040Output::new(Output::new(p.PIN_25, Level::Low));
        unwrap!(high.spawn(tasks::watchdog_task(
            config.watchdog.timeout_ms,
            BlinkReset::new(led)
        )));
    } else {
        warn!("Watchdog disabled");
    }

    unwrap!(spawner.spawn(tasks::app_task(app)));

    if config.stats.enabled {
        unwrap!(spawner.spawn(tasks::stats_task(config.stats.interval_ms)));
    }

    if config.simulate {
        unwrap!(spawner.spawn(tasks::demo_task(config.device_ids.clone())));
    }

    info!("All tasks spawned, terminal running");

    // Keeps the radio SET line driven
    loop {
        Timer::after_secs(60).await;
        trace!("Main heartbeat, radio run mode: {}", radio_mode.is_run_mode());
    }
}

/// Load configuration: flash, then embedded TOML, then built-in defaults
async fn load_config(storage: Rp2040FlashStorage<'static>) -> TerminalConfig {
    let mut persistence = ConfigPersistence::new(storage);

    match persistence.load().await {
        Ok(config) => {
            info!("Loaded configuration from flash");
            return config;
        }
        Err(e) => {
            info!("No valid configuration in flash ({}), using embedded", e);
        }
    }

    match parse_terminal_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            // Only reachable if terminal.toml and the build check disagree
            error!("Failed to parse embedded config: {}", e);
            error!("Using built-in defaults");
            TerminalConfig::default()
        }
    }
}
