//! Loop liveness supervision
//!
//! The control loop stamps [`WatchdogState`] once per iteration. An
//! independently scheduled checker compares the stamp against the clock
//! and, once the loop has been silent for longer than the timeout, shows a
//! failure indication and resets the node.
//!
//! The state is two atomics and nothing else, so the checker can run in
//! interrupt context and preempt the loop at any point:
//!
//! ```text
//!   control loop                      checker (higher priority)
//!   ────────────                      ─────────────────────────
//!   state.feed(now) ──► [last_ms] ◄── supervisor.check(now)
//!                       [triggered] ◄─ swap(true) exactly once ─► reset
//! ```

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Shortest checker period
pub const MIN_CHECK_PERIOD_MS: u32 = 100;

/// Failure indication: LED blinks before reset
pub const FAILURE_BLINKS: u8 = 4;

/// Failure indication blink on/off time
pub const FAILURE_BLINK_MS: u32 = 80;

/// Progress stamp shared between a control loop and its checker
pub struct WatchdogState {
    last_progress_ms: AtomicU32,
    triggered: AtomicBool,
}

impl WatchdogState {
    /// Fresh state, usable in a `static`
    pub const fn new() -> Self {
        Self {
            last_progress_ms: AtomicU32::new(0),
            triggered: AtomicBool::new(false),
        }
    }

    /// Mark loop progress at `now_ms`
    pub fn feed(&self, now_ms: u32) {
        self.last_progress_ms.store(now_ms, Ordering::Release);
    }

    pub fn last_progress_ms(&self) -> u32 {
        self.last_progress_ms.load(Ordering::Acquire)
    }

    /// Whether the reset path has been entered
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Claim the one-shot trigger; `true` only for the first caller
    fn try_trigger(&self) -> bool {
        !self.triggered.swap(true, Ordering::AcqRel)
    }
}

impl Default for WatchdogState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Loop made progress recently enough
    Healthy,
    /// Loop stalled; this call claimed the trigger
    Expired { silent_ms: u32 },
    /// Trigger was already claimed by an earlier check
    AlreadyTriggered,
}

/// What the checker does once the loop has stalled
pub trait ResetControl {
    /// Best-effort visible indication
    fn indicate_failure(&mut self);

    /// Restart the node; does not return on hardware
    fn hard_reset(&mut self);
}

/// Compares the loop's stamp against the clock
pub struct WatchdogSupervisor<'a> {
    state: &'a WatchdogState,
    timeout_ms: u32,
    enabled: bool,
}

impl<'a> WatchdogSupervisor<'a> {
    pub fn new(state: &'a WatchdogState, timeout_ms: u32, enabled: bool) -> Self {
        Self {
            state,
            timeout_ms,
            enabled,
        }
    }

    /// Checker period: half the timeout, never below [`MIN_CHECK_PERIOD_MS`]
    pub fn check_period_ms(&self) -> u32 {
        (self.timeout_ms / 2).max(MIN_CHECK_PERIOD_MS)
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Evaluate liveness at `now_ms`
    ///
    /// Expiry requires strictly more than the timeout to have elapsed.
    /// Only the first expired check returns [`Verdict::Expired`].
    pub fn check(&self, now_ms: u32) -> Verdict {
        if self.state.is_triggered() {
            return Verdict::AlreadyTriggered;
        }
        if !self.enabled {
            return Verdict::Healthy;
        }

        let silent_ms = now_ms.wrapping_sub(self.state.last_progress_ms());
        if silent_ms <= self.timeout_ms {
            return Verdict::Healthy;
        }

        if self.state.try_trigger() {
            Verdict::Expired { silent_ms }
        } else {
            Verdict::AlreadyTriggered
        }
    }

    /// Check and, on first expiry, indicate and reset
    pub fn supervise<R: ResetControl>(&self, now_ms: u32, reset: &mut R) -> Verdict {
        let verdict = self.check(now_ms);
        if let Verdict::Expired { silent_ms: _silent } = verdict {
            error!(
                "watchdog: loop silent for {} ms (limit {}), resetting",
                _silent, self.timeout_ms
            );
            reset.indicate_failure();
            reset.hard_reset();
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingReset {
        indications: u32,
        resets: u32,
    }

    impl ResetControl for CountingReset {
        fn indicate_failure(&mut self) {
            self.indications += 1;
        }

        fn hard_reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn test_check_period() {
        let state = WatchdogState::new();
        assert_eq!(WatchdogSupervisor::new(&state, 30_000, true).check_period_ms(), 15_000);
        assert_eq!(WatchdogSupervisor::new(&state, 150, true).check_period_ms(), 100);
    }

    #[test]
    fn test_healthy_while_fed() {
        let state = WatchdogState::new();
        let sup = WatchdogSupervisor::new(&state, 1000, true);

        state.feed(0);
        assert_eq!(sup.check(500), Verdict::Healthy);
        assert_eq!(sup.check(1000), Verdict::Healthy);
        state.feed(1000);
        assert_eq!(sup.check(1900), Verdict::Healthy);
        assert_eq!(state.last_progress_ms(), 1000);
    }

    #[test]
    fn test_fires_exactly_once() {
        let state = WatchdogState::new();
        let sup = WatchdogSupervisor::new(&state, 1000, true);
        let mut reset = CountingReset::default();

        state.feed(0);
        assert_eq!(
            sup.supervise(1001, &mut reset),
            Verdict::Expired { silent_ms: 1001 }
        );
        assert!(state.is_triggered());

        for now in [1500, 2000, 10_000] {
            assert_eq!(sup.supervise(now, &mut reset), Verdict::AlreadyTriggered);
        }
        // Feeding after the trigger does not re-arm
        state.feed(10_000);
        assert_eq!(sup.supervise(10_001, &mut reset), Verdict::AlreadyTriggered);

        assert_eq!(reset.indications, 1);
        assert_eq!(reset.resets, 1);
    }

    #[test]
    fn test_two_checkers_share_one_trigger() {
        let state = WatchdogState::new();
        let a = WatchdogSupervisor::new(&state, 100, true);
        let b = WatchdogSupervisor::new(&state, 100, true);

        state.feed(0);
        assert!(matches!(a.check(500), Verdict::Expired { .. }));
        assert_eq!(b.check(500), Verdict::AlreadyTriggered);
    }

    #[test]
    fn test_disabled_never_fires() {
        let state = WatchdogState::new();
        let sup = WatchdogSupervisor::new(&state, 100, false);
        let mut reset = CountingReset::default();
        assert_eq!(sup.supervise(1_000_000, &mut reset), Verdict::Healthy);
        assert_eq!(reset.resets, 0);
    }

    #[test]
    fn test_clock_wrap() {
        let state = WatchdogState::new();
        let sup = WatchdogSupervisor::new(&state, 1000, true);
        state.feed(u32::MAX - 100);
        assert_eq!(sup.check(500), Verdict::Healthy);
        assert!(matches!(sup.check(1000), Verdict::Expired { silent_ms: 1101 }));
    }

    #[test]
    fn test_concurrent_checkers_single_expiry() {
        use std::sync::atomic::{AtomicU32 as Count, Ordering as O};
        use std::sync::Arc;

        static STATE: WatchdogState = WatchdogState::new();
        let expiries = Arc::new(Count::new(0));

        let handles: std::vec::Vec<_> = (0..8)
            .map(|_| {
                let expiries = Arc::clone(&expiries);
                std::thread::spawn(move || {
                    let sup = WatchdogSupervisor::new(&STATE, 10, true);
                    for now in 100..200 {
                        if let Verdict::Expired { .. } = sup.check(now) {
                            expiries.fetch_add(1, O::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(expiries.load(O::SeqCst), 1);
    }
}
