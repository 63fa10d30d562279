//! Status LED shared between the main loop and the watchdog
//!
//! The responder pulses the LED on every answered request; the watchdog
//! blinks it from interrupt context before resetting. Both go through a
//! critical-section mutex.

use core::cell::RefCell;

use dtd_hal::OutputPin;
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

static LED: Mutex<CriticalSectionRawMutex, RefCell<Option<Output<'static>>>> =
    Mutex::new(RefCell::new(None));

/// Handle to the shared status LED
#[derive(Debug, Clone, Copy)]
pub struct SharedLed;

impl SharedLed {
    /// Hand the LED pin over to the shared slot
    pub fn install(led: Output<'static>) -> Self {
        LED.lock(|cell| *cell.borrow_mut() = Some(led));
        SharedLed
    }

    fn with<R>(f: impl FnOnce(&mut Output<'static>) -> R) -> Option<R> {
        LED.lock(|cell| cell.borrow_mut().as_mut().map(f))
    }
}

impl OutputPin for SharedLed {
    fn set_high(&mut self) {
        Self::with(|led| led.set_high());
    }

    fn set_low(&mut self) {
        Self::with(|led| led.set_low());
    }

    fn is_set_high(&self) -> bool {
        Self::with(|led| led.is_set_high()).unwrap_or(false)
    }
}
