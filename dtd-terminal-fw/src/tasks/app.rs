//! Terminal main loop task

use defmt::*;
use embassy_time::Timer;

use dtd_core::link::{RandomSimulation, SerialTransport};
use dtd_core::terminal::TerminalApp;
use dtd_hal_rp2040::time::EmbassyClock;
use dtd_hal_rp2040::uart::RadioUart;

use crate::channels::{StatsSnapshot, STATS, TESTING_TARGET};
use crate::render::LogRenderer;

/// Concrete terminal application on this board
pub type Terminal = TerminalApp<
    'static,
    SerialTransport<RadioUart>,
    EmbassyClock,
    RandomSimulation,
    LogRenderer,
>;

/// Run the terminal loop forever
///
/// The only suspension point is the wait after each iteration; exchanges
/// on the physical radio block the executor while they run.
#[embassy_executor::task]
pub async fn app_task(mut app: Terminal) {
    info!("Terminal loop started");

    loop {
        if let Some(target) = TESTING_TARGET.try_take() {
            app.set_testing(target);
        }

        let wait_ms = app.run_iteration();

        *STATS.lock().await = StatsSnapshot {
            loops: app.loop_count(),
            errors: app.error_count(),
            link: *app.stats(),
        };

        Timer::after_millis(u64::from(wait_ms)).await;
    }
}
