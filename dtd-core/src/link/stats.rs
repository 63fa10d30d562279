//! Radio link statistics
//!
//! Observability only: nothing here feeds back into control flow.

/// Weight of a new RSSI sample in the running average
const RSSI_ALPHA: f32 = 0.1;

/// Counters for one radio link
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames written
    pub tx_count: u32,
    /// Valid frames received
    pub rx_count: u32,
    /// Writes that failed or were truncated
    pub tx_errors: u32,
    /// Read errors reported by the transport
    pub rx_errors: u32,
    /// Single attempts that got no valid reply in time
    pub attempt_failures: u32,
    /// Exchanges that exhausted every attempt
    pub timeouts: u32,
    /// Exponentially smoothed RSSI of received replies
    pub avg_rssi: f32,
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            tx_count: 0,
            rx_count: 0,
            tx_errors: 0,
            rx_errors: 0,
            attempt_failures: 0,
            timeouts: 0,
            avg_rssi: 0.0,
        }
    }

    /// Record a transmit attempt
    pub fn update_tx(&mut self, success: bool) {
        self.tx_count = self.tx_count.wrapping_add(1);
        if !success {
            self.tx_errors = self.tx_errors.wrapping_add(1);
        }
    }

    /// Record a receive outcome
    ///
    /// The RSSI average only moves on successful receptions that carry a
    /// sample.
    pub fn update_rx(&mut self, success: bool, rssi: Option<u8>) {
        self.rx_count = self.rx_count.wrapping_add(1);
        if !success {
            self.rx_errors = self.rx_errors.wrapping_add(1);
            return;
        }
        if let Some(sample) = rssi {
            self.avg_rssi = self.avg_rssi * (1.0 - RSSI_ALPHA) + f32::from(sample) * RSSI_ALPHA;
        }
    }

    /// Record an exchange that ran out of attempts
    pub fn update_timeout(&mut self) {
        self.timeouts = self.timeouts.wrapping_add(1);
    }

    /// Record one attempt without a valid reply
    pub fn record_attempt_failure(&mut self) {
        self.attempt_failures = self.attempt_failures.wrapping_add(1);
    }

    /// Percentage of error-free transfers, 0.0 before any traffic
    pub fn success_rate(&self) -> f32 {
        let total = self.tx_count as f32 + self.rx_count as f32;
        if total == 0.0 {
            return 0.0;
        }
        let errors = self.tx_errors as f32 + self.rx_errors as f32;
        100.0 * (1.0 - errors / total)
    }

    /// Total error count (tx + rx)
    pub fn errors(&self) -> u32 {
        self.tx_errors.wrapping_add(self.rx_errors)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = LinkStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.update_tx(true);
        stats.update_tx(false);
        stats.update_rx(true, None);
        stats.update_rx(true, None);
        assert_eq!(stats.errors(), 1);
        assert!((stats.success_rate() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_rssi_smoothing() {
        let mut stats = LinkStats::new();
        stats.update_rx(true, Some(100));
        assert!((stats.avg_rssi - 10.0).abs() < 1e-4);
        stats.update_rx(true, Some(100));
        assert!((stats.avg_rssi - 19.0).abs() < 1e-4);
        stats.update_rx(false, Some(0));
        assert!((stats.avg_rssi - 19.0).abs() < 1e-4);
        stats.update_rx(true, None);
        assert!((stats.avg_rssi - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset() {
        let mut stats = LinkStats::new();
        stats.update_tx(false);
        stats.update_timeout();
        stats.record_attempt_failure();
        stats.reset();
        assert_eq!(stats, LinkStats::new());
    }
}
