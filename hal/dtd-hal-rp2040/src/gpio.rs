//! GPIO wrappers
//!
//! Newtypes over embassy-rp pins implementing the `dtd-hal` pin traits.

use dtd_hal::{InputPin, OutputPin};
use embassy_rp::gpio::{Input, Level, Output};

/// Push-pull output (status LED, radio enable)
pub struct Rp2040Output<'d> {
    pin: Output<'d>,
}

impl<'d> Rp2040Output<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> Output<'d> {
        self.pin
    }
}

impl OutputPin for Rp2040Output<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Digital input (presence sense, strap pins)
pub struct Rp2040Input<'d> {
    pin: Input<'d>,
}

impl<'d> Rp2040Input<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl InputPin for Rp2040Input<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

/// Run/config line of a GT38-style radio module
///
/// The module bridges the UART over the air while SET is high and takes AT
/// commands while it is low.
pub struct RadioModePin<'d> {
    pin: Output<'d>,
}

impl<'d> RadioModePin<'d> {
    /// Take the pin and put the module in run mode
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_level(Level::High);
        Self { pin }
    }

    pub fn set_run_mode(&mut self) {
        self.pin.set_high();
    }

    pub fn is_run_mode(&self) -> bool {
        self.pin.is_set_high()
    }
}
