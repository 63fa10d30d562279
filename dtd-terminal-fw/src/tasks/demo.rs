//! Demo sequencer for simulation mode
//!
//! Focuses each configured detector in turn, then idles, forever.

use defmt::*;
use embassy_time::Timer;
use heapless::Vec;

use dtd_core::device::MAX_DEVICES;

use crate::channels::TESTING_TARGET;

/// Time each detector stays under test
const TEST_DWELL_MS: u64 = 1500;

/// Idle pause between two rounds
const ROUND_PAUSE_MS: u64 = 1200;

#[embassy_executor::task]
pub async fn demo_task(device_ids: Vec<u8, MAX_DEVICES>) {
    info!("Demo task started");

    loop {
        for &id in &device_ids {
            debug!("Demo: testing DD {}", id);
            TESTING_TARGET.signal(Some(id));
            Timer::after_millis(TEST_DWELL_MS).await;
        }
        TESTING_TARGET.signal(None);
        Timer::after_millis(ROUND_PAUSE_MS).await;
    }
}
