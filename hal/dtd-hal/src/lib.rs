//! DTD Hardware Abstraction Layer
//!
//! This crate defines the hardware traits shared by the detector (DD) and
//! terminal (TA) firmware. Chip-specific crates implement them, so the
//! protocol and reliability logic in `dtd-core` can run unchanged on the
//! target and on a development host.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  dtd-terminal-fw      dtd-detector-fw    │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  dtd-core (link, detector, watchdog)     │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  dtd-hal (this crate - traits)           │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  dtd-hal-rp2040                          │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - status LED, radio control
//!   lines, identity strap pins, presence input
//! - [`uart::UartTx`], [`uart::UartRx`] - the serial radio module
//! - [`flash::FlashStorage`] - persistent identity and configuration blobs

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{InputPin, OutputPin};
pub use uart::{UartConfig, UartRx, UartTx};
