//! GPIO pin abstractions
//!
//! Both node roles drive a handful of discrete lines: the status LED, the
//! radio enable / SET line, and (on detectors) the presence input and the
//! three identity strap pins read once at boot.

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Drive the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    ///
    /// Strap pins are pulled up, so a strap tied to ground reads low.
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Line {
        high: bool,
    }

    impl OutputPin for Line {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    impl InputPin for Line {
        fn is_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_set_state_drives_level() {
        let mut line = Line { high: false };
        line.set_state(true);
        assert!(line.is_set_high());
        line.set_state(false);
        assert!(!line.is_set_high());
    }

    #[test]
    fn test_is_low_default() {
        let line = Line { high: false };
        assert!(line.is_low());
        let line = Line { high: true };
        assert!(!line.is_low());
    }
}
