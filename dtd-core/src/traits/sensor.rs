//! Presence sampling

use dtd_hal::InputPin;

/// Source of the detector's presence reading
pub trait PresenceSensor {
    /// Sample the input once
    fn is_present(&mut self) -> bool;
}

/// Presence read from a digital input
///
/// `active_high` selects which level means "present".
pub struct PinPresence<P> {
    pin: P,
    active_high: bool,
}

impl<P: InputPin> PinPresence<P> {
    pub fn new(pin: P, active_high: bool) -> Self {
        Self { pin, active_high }
    }
}

impl<P: InputPin> PresenceSensor for PinPresence<P> {
    fn is_present(&mut self) -> bool {
        self.pin.is_high() == self.active_high
    }
}

/// Sensor with a fixed reading, for boards without a sense input wired
pub struct FixedPresence(pub bool);

impl PresenceSensor for FixedPresence {
    fn is_present(&mut self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Level(bool);

    impl InputPin for Level {
        fn is_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_pin_polarity() {
        assert!(PinPresence::new(Level(true), true).is_present());
        assert!(!PinPresence::new(Level(true), false).is_present());
        assert!(PinPresence::new(Level(false), false).is_present());
        assert!(FixedPresence(true).is_present());
    }
}
