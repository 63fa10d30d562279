//! Async tasks for the detector

mod responder;
mod watchdog;

pub use responder::{responder_task, Detector};
pub use watchdog::watchdog_task;
