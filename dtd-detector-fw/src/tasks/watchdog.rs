//! Watchdog checker task
//!
//! Runs on the interrupt executor so a wedged responder loop cannot
//! starve it.

use defmt::*;
use embassy_time::{Duration, Ticker};

use dtd_core::watchdog::WatchdogSupervisor;
use dtd_hal_rp2040::reset::BlinkReset;
use dtd_hal_rp2040::time::now_ms;

use crate::led::SharedLed;
use crate::WATCHDOG;

#[embassy_executor::task]
pub async fn watchdog_task(timeout_ms: u32, mut reset: BlinkReset<SharedLed>) {
    let supervisor = WatchdogSupervisor::new(&WATCHDOG, timeout_ms, true);
    debug!("Watchdog armed: timeout {} ms", timeout_ms);

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(
        supervisor.check_period_ms(),
    )));

    loop {
        ticker.next().await;
        supervisor.supervise(now_ms(), &mut reset);
    }
}
