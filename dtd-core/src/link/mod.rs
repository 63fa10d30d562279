//! Terminal radio link
//!
//! - [`transport`]: byte pipe to the radio module
//! - [`engine`]: retrying request/response exchanges and device polling
//! - [`simulation`]: synthesized replies when no module is fitted
//! - [`retry`], [`stats`]: policy and observability

pub mod engine;
pub mod retry;
pub mod simulation;
pub mod stats;
pub mod transport;

pub use engine::{LinkMode, RadioLink};
pub use retry::RetryPolicy;
pub use simulation::{RandomSimulation, SimulationSource, SteadySimulation};
pub use stats::LinkStats;
pub use transport::{NoTransport, SerialTransport, Transport};
