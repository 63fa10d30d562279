//! Watchdog checker task
//!
//! Spawned on the interrupt executor. Compares the main loop's stamp
//! against the clock every half timeout and resets the board once the
//! loop has gone quiet for too long.

use defmt::*;
use embassy_time::{Duration, Ticker};

use dtd_core::watchdog::WatchdogSupervisor;
use dtd_hal_rp2040::gpio::Rp2040Output;
use dtd_hal_rp2040::reset::BlinkReset;
use dtd_hal_rp2040::time::now_ms;

use crate::channels::WATCHDOG;

#[embassy_executor::task]
pub async fn watchdog_task(timeout_ms: u32, mut reset: BlinkReset<Rp2040Output<'static>>) {
    let supervisor = WatchdogSupervisor::new(&WATCHDOG, timeout_ms, true);
    info!(
        "Watchdog armed: timeout {} ms, check every {} ms",
        timeout_ms,
        supervisor.check_period_ms()
    );

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(
        supervisor.check_period_ms(),
    )));

    loop {
        ticker.next().await;
        supervisor.supervise(now_ms(), &mut reset);
    }
}
