//! Detector-side line protocol handler
//!
//! Bytes from the radio are split into lines and dispatched:
//!
//! - `POLL:<id>` addressed to this detector (or `ALL`) samples presence
//!   and answers `ACK:<id>:<0|1>`
//! - `SETID:<id>` persists the new identifier first and only then adopts
//!   it, answering `ACKSETID:<id>:<OK|ERR>`
//! - anything else is dropped without a reply
//!
//! Successful POLLs and SETIDs pulse the status LED.

use dtd_hal::OutputPin;
use dtd_protocol::{
    format_ack, format_boot, format_setid_ack, is_addressed_to, parse_line, DetectorId,
    LineBuffer, LineCommand, OutLine,
};
use heapless::Vec;

use super::identity::IdentityStore;
use crate::traits::{Clock, PresenceSensor};

/// LED pulse after an answered POLL
pub const POLL_PULSE_MS: u32 = 40;

/// LED pulse after a successful SETID, and at boot
pub const SETID_PULSE_MS: u32 = 100;

/// Replies returned from a single [`Responder::feed`] call
pub const MAX_REPLIES: usize = 4;

/// Detector activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponderCounters {
    /// POLLs addressed to us and answered
    pub polls_answered: u32,
    /// POLLs for another detector
    pub not_addressed: u32,
    /// Identifier changes persisted
    pub setid_ok: u32,
    /// Identifier changes that failed to persist
    pub setid_err: u32,
    /// Malformed, unknown or oversized lines
    pub lines_discarded: u32,
    /// Replies dropped because a read produced too many
    pub replies_dropped: u32,
}

/// Line-protocol state machine of a detector node
pub struct Responder<P, L, S, C> {
    id: DetectorId,
    sensor: P,
    led: L,
    store: S,
    clock: C,
    lines: LineBuffer,
    counters: ResponderCounters,
}

impl<P, L, S, C> Responder<P, L, S, C>
where
    P: PresenceSensor,
    L: OutputPin,
    S: IdentityStore,
    C: Clock,
{
    pub fn new(id: DetectorId, sensor: P, led: L, store: S, clock: C) -> Self {
        Self {
            id,
            sensor,
            led,
            store,
            clock,
            lines: LineBuffer::new(),
            counters: ResponderCounters::default(),
        }
    }

    /// Current identifier
    pub fn identity(&self) -> &DetectorId {
        &self.id
    }

    /// Snapshot of the activity counters
    pub fn counters(&self) -> ResponderCounters {
        ResponderCounters {
            lines_discarded: self
                .counters
                .lines_discarded
                .wrapping_add(self.lines.overflows()),
            ..self.counters
        }
    }

    /// `BOOT:<id>` announcement
    pub fn boot_line(&self) -> OutLine {
        format_boot(&self.id)
    }

    /// Boot blink, then the announcement to send
    pub fn start(&mut self) -> OutLine {
        self.pulse(SETID_PULSE_MS);
        self.boot_line()
    }

    /// Feed received bytes; returns the replies to transmit, in order
    ///
    /// A partial trailing line is kept for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<OutLine, MAX_REPLIES> {
        let mut replies = Vec::new();
        for &byte in bytes {
            let Some(line) = self.lines.feed(byte) else {
                continue;
            };
            if let Some(reply) = self.handle_line(&line) {
                if replies.push(reply).is_err() {
                    self.counters.replies_dropped = self.counters.replies_dropped.wrapping_add(1);
                }
            }
        }
        replies
    }

    /// Dispatch one complete line
    pub fn handle_line(&mut self, line: &[u8]) -> Option<OutLine> {
        let Some(command) = parse_line(line) else {
            self.counters.lines_discarded = self.counters.lines_discarded.wrapping_add(1);
            return None;
        };

        match command {
            LineCommand::Poll { target } => {
                if !is_addressed_to(target, &self.id) {
                    self.counters.not_addressed = self.counters.not_addressed.wrapping_add(1);
                    return None;
                }
                let present = self.sensor.is_present();
                let reply = format_ack(&self.id, present);
                self.counters.polls_answered = self.counters.polls_answered.wrapping_add(1);
                self.pulse(POLL_PULSE_MS);
                Some(reply)
            }
            LineCommand::SetId { id } => {
                let ok = self.set_identity(id.clone());
                Some(format_setid_ack(&id, ok))
            }
        }
    }

    /// Persist and adopt a new identifier
    ///
    /// The in-memory identifier only changes once the store has accepted
    /// the new value. Returns whether the change took effect.
    pub fn set_identity(&mut self, id: DetectorId) -> bool {
        match self.store.persist(&id) {
            Ok(()) => {
                info!("identity: {} -> {}", self.id.as_str(), id.as_str());
                self.id = id;
                self.counters.setid_ok = self.counters.setid_ok.wrapping_add(1);
                self.pulse(SETID_PULSE_MS);
                true
            }
            Err(_e) => {
                warn!("identity: persisting {} failed: {:?}", id.as_str(), _e);
                self.counters.setid_err = self.counters.setid_err.wrapping_add(1);
                false
            }
        }
    }

    fn pulse(&mut self, ms: u32) {
        self.led.set_high();
        self.clock.delay_ms(ms);
        self.led.set_low();
    }
}
