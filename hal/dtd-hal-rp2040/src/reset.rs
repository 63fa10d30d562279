//! Watchdog failure path
//!
//! Runs from the interrupt-priority checker: blinks the status LED, then
//! resets the chip through the SCB.

use dtd_core::watchdog::{ResetControl, FAILURE_BLINKS, FAILURE_BLINK_MS};
use dtd_hal::OutputPin;
use embassy_time::{block_for, Duration};

/// Blink-then-reset [`ResetControl`]
pub struct BlinkReset<L> {
    led: L,
}

impl<L: OutputPin> BlinkReset<L> {
    pub fn new(led: L) -> Self {
        Self { led }
    }
}

impl<L: OutputPin> ResetControl for BlinkReset<L> {
    fn indicate_failure(&mut self) {
        let period = Duration::from_millis(u64::from(FAILURE_BLINK_MS));
        for _ in 0..FAILURE_BLINKS {
            self.led.set_high();
            block_for(period);
            self.led.set_low();
            block_for(period);
        }
    }

    fn hard_reset(&mut self) {
        cortex_m::peripheral::SCB::sys_reset();
    }
}
