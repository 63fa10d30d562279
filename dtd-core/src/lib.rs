//! Board-agnostic core logic for the DTD detector network
//!
//! Everything here runs unchanged on the RP2040 and on a development host:
//!
//! - Hardware-facing traits the firmware implements (clock, presence
//!   sensor, status renderer)
//! - Terminal configuration types, TOML loading and validation
//! - The device table tracking every configured detector
//! - The radio link: transport seam, retrying exchange engine, simulation
//!   strategy and link statistics
//! - The detector responder: identity resolution, line dispatch and
//!   identity persistence
//! - The watchdog supervisor shared by both node roles
//! - One iteration of the terminal control loop

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod detector;
pub mod device;
pub mod link;
pub mod terminal;
pub mod traits;
pub mod watchdog;

pub use dtd_protocol::{DetectorId, PresenceState};
