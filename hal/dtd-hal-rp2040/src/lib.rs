//! RP2040-specific HAL for the DTD firmware
//!
//! This crate provides RP2040 implementations of the shared `dtd-hal`
//! traits and the `dtd-core` platform hooks:
//!
//! - GPIO wrappers for the LED, radio control lines and strap inputs
//! - The buffered radio UART
//! - Flash storage driver (implements `dtd_hal::FlashStorage`)
//! - Millisecond clock on top of `embassy-time`
//! - Watchdog failure indication and hard reset

#![no_std]

pub mod flash;
pub mod gpio;
pub mod reset;
pub mod time;
pub mod uart;

// Re-export shared traits from dtd-hal for convenience
pub use dtd_hal::{FlashStorage as FlashStorageTrait, StorageKey};
