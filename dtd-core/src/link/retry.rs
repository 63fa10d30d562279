//! Retry policy for request/response exchanges

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bounded retry with geometric timeout growth and linear backoff
///
/// Attempt `n` (0-indexed) waits `timeout_base_ms × multiplier^n` for a
/// reply. The multiplier is fixed-point: `timeout_multiplier_x100 = 150`
/// means ×1.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetryPolicy {
    /// Attempts per exchange (at least 1)
    pub max_attempts: u8,
    /// Timeout of the first attempt
    pub timeout_base_ms: u32,
    /// Per-attempt timeout growth (×100)
    pub timeout_multiplier_x100: u16,
    /// Wait between failed attempts
    pub backoff_enabled: bool,
    /// Backoff increment; attempt `n` is followed by `backoff_ms × (n + 1)`
    pub backoff_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_base_ms: 500,
            timeout_multiplier_x100: 150,
            backoff_enabled: true,
            backoff_ms: 100,
        }
    }
}

impl RetryPolicy {
    /// Single attempt with a fixed timeout
    pub const fn single(timeout_ms: u32) -> Self {
        Self {
            max_attempts: 1,
            timeout_base_ms: timeout_ms,
            timeout_multiplier_x100: 100,
            backoff_enabled: false,
            backoff_ms: 0,
        }
    }

    /// Reply timeout for a 0-indexed attempt
    pub fn timeout_for_attempt(&self, attempt: u8) -> u32 {
        let mut timeout = u64::from(self.timeout_base_ms);
        for _ in 0..attempt {
            timeout = timeout * u64::from(self.timeout_multiplier_x100) / 100;
            if timeout >= u64::from(u32::MAX) {
                return u32::MAX;
            }
        }
        timeout as u32
    }

    /// Delay inserted after a failed attempt
    ///
    /// Zero after the last attempt and when backoff is disabled.
    pub fn backoff_after_attempt(&self, attempt: u8) -> u32 {
        if !self.backoff_enabled || attempt.saturating_add(1) >= self.max_attempts {
            return 0;
        }
        self.backoff_ms.saturating_mul(u32::from(attempt) + 1)
    }

    /// Longest time one exchange can block: every attempt times out
    pub fn worst_case_ms(&self) -> u32 {
        (0..self.max_attempts).fold(0u32, |total, attempt| {
            total
                .saturating_add(self.timeout_for_attempt(attempt))
                .saturating_add(self.backoff_after_attempt(attempt))
        })
    }
}
