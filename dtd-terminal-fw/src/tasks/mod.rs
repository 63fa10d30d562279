//! Embassy async tasks
//!
//! The main loop, the statistics report and the demo sequencer share the
//! thread-mode executor. The watchdog checker runs on an interrupt
//! executor so it preempts a blocked main loop.

pub mod app;
pub mod demo;
pub mod stats;
pub mod watchdog;

pub use app::{app_task, Terminal};
pub use demo::demo_task;
pub use stats::stats_task;
pub use watchdog::watchdog_task;
