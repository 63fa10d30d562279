//! Configuration type definitions

use dtd_protocol::DetectorId;
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::MAX_DEVICES;
use crate::link::RetryPolicy;

/// Configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Minimum wait between terminal loop iterations while a device is under
/// focused test
pub const MIN_TEST_PERIOD_MS: u32 = 150;

/// Terminal loop pause when nothing is under focused test
pub const IDLE_LOOP_MS: u32 = 200;

/// Watchdog settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchdogConfig {
    pub enabled: bool,
    /// Longest tolerated gap between two loop iterations
    pub timeout_ms: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 30_000,
        }
    }
}

/// Periodic statistics report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatsConfig {
    pub enabled: bool,
    pub interval_ms: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 30_000,
        }
    }
}

/// Terminal (TA) configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerminalConfig {
    /// Config format version
    pub version: u8,
    /// Detectors to poll, in display order
    pub device_ids: Vec<u8, MAX_DEVICES>,
    /// Target interval between two polling sweeps
    pub poll_period_ms: u32,
    /// Timeout of single, non-retried exchanges (PING)
    pub reply_timeout_ms: u32,
    pub retry: RetryPolicy,
    /// Synthesize replies instead of using the radio
    pub simulate: bool,
    /// Seed of the simulation RNG
    pub rng_seed: u64,
    pub watchdog: WatchdogConfig,
    pub stats: StatsConfig,
    /// Verbose logging
    pub debug: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        let mut device_ids = Vec::new();
        for id in 1..=5 {
            let _ = device_ids.push(id);
        }
        Self {
            version: CONFIG_VERSION,
            device_ids,
            poll_period_ms: 1500,
            reply_timeout_ms: 500,
            retry: RetryPolicy::default(),
            simulate: true,
            rng_seed: 12345,
            watchdog: WatchdogConfig::default(),
            stats: StatsConfig::default(),
            debug: false,
        }
    }
}

impl TerminalConfig {
    /// Pause after a loop iteration
    pub fn loop_wait_ms(&self, testing: bool) -> u32 {
        if testing {
            self.poll_period_ms.max(MIN_TEST_PERIOD_MS)
        } else {
            IDLE_LOOP_MS
        }
    }

    /// Longest a full blocking sweep of every device can take
    pub fn worst_case_sweep_ms(&self) -> u32 {
        self.retry
            .worst_case_ms()
            .saturating_mul(self.device_ids.len() as u32)
    }
}

/// Detector (DD) configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectorConfig {
    /// Identifier fixed at build time; overrides storage and straps
    pub static_id: Option<DetectorId>,
    pub watchdog_timeout_ms: u32,
    /// Pause between two main loop iterations
    pub loop_interval_ms: u32,
    /// Counters are logged every this many loop iterations
    pub stats_every_loops: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            static_id: None,
            watchdog_timeout_ms: 30_000,
            loop_interval_ms: 10,
            stats_every_loops: 1000,
        }
    }
}

impl DetectorConfig {
    /// Defaults with an optional build-time identifier
    ///
    /// An invalid identifier is ignored.
    pub fn with_static_id(id: Option<&str>) -> Self {
        Self {
            static_id: id.and_then(DetectorId::new),
            ..Self::default()
        }
    }
}
