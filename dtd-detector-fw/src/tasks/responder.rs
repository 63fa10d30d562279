//! Detector main loop
//!
//! Drains the radio UART, hands the bytes to the responder and writes
//! back whatever replies it produced. The watchdog is stamped once per
//! pass.

use defmt::*;
use embassy_time::Timer;

use dtd_core::detector::{FlashIdentityStore, Responder};
use dtd_core::traits::PinPresence;
use dtd_hal::{UartRx, UartTx};
use dtd_hal_rp2040::flash::Rp2040FlashStorage;
use dtd_hal_rp2040::gpio::Rp2040Input;
use dtd_hal_rp2040::time::{now_ms, EmbassyClock};
use dtd_hal_rp2040::uart::RadioUart;

use crate::led::SharedLed;
use crate::WATCHDOG;

pub type Detector = Responder<
    PinPresence<Rp2040Input<'static>>,
    SharedLed,
    FlashIdentityStore<Rp2040FlashStorage<'static>>,
    EmbassyClock,
>;

#[embassy_executor::task]
pub async fn responder_task(
    mut detector: Detector,
    mut radio: RadioUart,
    interval_ms: u32,
    stats_every: u32,
) {
    let boot = detector.start();
    send(&mut radio, boot.as_bytes());
    info!("Detector {} online", detector.identity().as_str());

    let mut buf = [0u8; 64];
    let mut loops: u32 = 0;

    loop {
        WATCHDOG.feed(now_ms());
        loops = loops.wrapping_add(1);

        match radio.read_available(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                for reply in detector.feed(&buf[..n]) {
                    send(&mut radio, reply.as_bytes());
                }
            }
            Err(e) => warn!("UART read error: {:?}", e),
        }

        if stats_every > 0 && loops % stats_every == 0 {
            let c = detector.counters();
            info!(
                "Detector {}: answered={} other={} setid ok/err={}/{} discarded={} dropped={}",
                detector.identity().as_str(),
                c.polls_answered,
                c.not_addressed,
                c.setid_ok,
                c.setid_err,
                c.lines_discarded,
                c.replies_dropped
            );
        }

        Timer::after_millis(u64::from(interval_ms)).await;
    }
}

fn send(radio: &mut RadioUart, bytes: &[u8]) {
    match radio.write_blocking(bytes) {
        Ok(n) if n < bytes.len() => warn!("UART write truncated: {}/{}", n, bytes.len()),
        Ok(_) => {}
        Err(e) => {
            warn!("UART write error: {:?}", e);
            return;
        }
    }
    if let Err(e) = radio.flush() {
        warn!("UART flush error: {:?}", e);
    }
}
