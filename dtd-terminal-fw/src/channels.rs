//! Inter-task communication
//!
//! Static embassy-sync primitives shared by the terminal tasks, plus the
//! watchdog stamp read from interrupt context.

use dtd_core::link::LinkStats;
use dtd_core::watchdog::WatchdogState;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

/// Device to focus for testing (`None` clears the focus)
pub static TESTING_TARGET: Signal<CriticalSectionRawMutex, Option<u8>> = Signal::new();

/// Progress stamp of the main loop, checked by the watchdog task
pub static WATCHDOG: WatchdogState = WatchdogState::new();

/// Counters published by the main loop for the statistics task
#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub loops: u32,
    pub errors: u32,
    pub link: LinkStats,
}

impl StatsSnapshot {
    pub const fn new() -> Self {
        Self {
            loops: 0,
            errors: 0,
            link: LinkStats::new(),
        }
    }
}

/// Latest published counters
pub static STATS: Mutex<CriticalSectionRawMutex, StatsSnapshot> = Mutex::new(StatsSnapshot::new());
