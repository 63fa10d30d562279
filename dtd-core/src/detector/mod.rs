//! Detector (DD) node logic
//!
//! - [`identity`]: boot-time identifier resolution and its persistence
//! - [`responder`]: the line-protocol loop body

pub mod identity;
pub mod responder;

pub use identity::{
    resolve_identity, strap_code_to_id, FlashIdentityStore, IdentitySource, IdentityStore,
    StoreError, StrapPins, FALLBACK_ID,
};
pub use responder::{Responder, ResponderCounters, MAX_REPLIES, POLL_PULSE_MS, SETID_PULSE_MS};
