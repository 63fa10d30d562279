//! Hardware-facing traits
//!
//! The firmware implements these on top of embassy; tests implement them
//! with deterministic doubles.

pub mod clock;
pub mod render;
pub mod sensor;

pub use clock::Clock;
pub use render::{RenderError, StatusRenderer};
pub use sensor::{FixedPresence, PinPresence, PresenceSensor};
