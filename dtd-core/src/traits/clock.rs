//! Monotonic time source

/// Millisecond clock with a blocking delay
///
/// Timestamps wrap at `u32::MAX`; compare them with `wrapping_sub`.
/// `delay_ms` blocks the caller: exchanges on a physical transport never
/// yield to the scheduler.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u32;

    /// Busy-wait for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Milliseconds elapsed since `since`
    fn elapsed_since(&self, since: u32) -> u32 {
        self.now_ms().wrapping_sub(since)
    }
}

impl<C: Clock> Clock for &mut C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockClock;
    use super::*;

    #[test]
    fn test_elapsed_across_wrap() {
        let mut clock = MockClock::at(u32::MAX - 10);
        let start = clock.now_ms();
        clock.delay_ms(25);
        assert_eq!(clock.elapsed_since(start), 25);
    }
}
