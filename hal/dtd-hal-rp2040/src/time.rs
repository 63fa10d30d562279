//! Millisecond clock backed by the embassy time driver

use dtd_core::traits::Clock;
use embassy_time::{block_for, Duration, Instant};

/// [`Clock`] over the RP2040 timer
///
/// `delay_ms` spins without yielding to the executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation wraps after ~49 days; callers use wrapping arithmetic
        Instant::now().as_millis() as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}

/// Current time in wrapping milliseconds
pub fn now_ms() -> u32 {
    EmbassyClock.now_ms()
}
