//! Terminal-side view of the detector population
//!
//! The set of monitored devices is fixed by configuration: the table is
//! built once and entries are never added or removed afterwards.

mod table;

pub use table::{DeviceSnapshot, DeviceStatus, DeviceTable, LinkCounters, MAX_DEVICES};
