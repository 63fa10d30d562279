//! Periodic statistics report

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::STATS;

#[embassy_executor::task]
pub async fn stats_task(interval_ms: u32) {
    info!("Stats task started ({} ms)", interval_ms);

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(interval_ms)));

    loop {
        ticker.next().await;

        let snapshot = *STATS.lock().await;
        let link = &snapshot.link;
        info!("=== Statistics ===");
        info!("Loops: {} | Errors: {}", snapshot.loops, snapshot.errors);
        info!(
            "Radio: tx={} rx={} tx_err={} rx_err={} misses={} timeouts={}",
            link.tx_count,
            link.rx_count,
            link.tx_errors,
            link.rx_errors,
            link.attempt_failures,
            link.timeouts
        );
        info!(
            "Radio: success {}% avg rssi {}",
            link.success_rate(),
            link.avg_rssi
        );
    }
}
