//! Configuration types
//!
//! The terminal reads its configuration from TOML (flash or embedded) or
//! from a postcard blob; the detector's few settings are fixed at build
//! time.

pub mod toml;
pub mod types;
pub mod validate;

pub use self::toml::{parse_terminal_config, ParseError};
pub use types::*;
pub use validate::{has_critical, validate, ConfigIssue, Issues, Severity};
