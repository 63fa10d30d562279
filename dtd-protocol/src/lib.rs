//! DTD radio link protocol
//!
//! Two wire formats travel over the same half-duplex serial radio:
//!
//! Binary frames, used by the terminal's radio link:
//! ```text
//! ┌───────┬─────┬─────┬────────┬─────┬─────────────┬──────────┬─────┐
//! │ START │ VER │ CMD │ TARGET │ LEN │ PAYLOAD     │ CHECKSUM │ END │
//! │ 0xA5  │ 1B  │ 1B  │ 1B     │ 1B  │ 0–9B        │ 1B       │ 0x5A│
//! └───────┴─────┴─────┴────────┴─────┴─────────────┴──────────┴─────┘
//! ```
//!
//! ASCII lines, used by detector nodes:
//! ```text
//! POLL:<id>\n   SETID:<id>\n   ACK:<id>:<0|1>\n   ACKSETID:<id>:<OK|ERR>\n   BOOT:<id>\n
//! ```
//!
//! All decoding is total: malformed input yields `None`, never an error.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod line;
pub mod messages;

pub use frame::{
    decode_frame, encode_frame, Frame, FrameError, RxBuffer, FRAME_END, FRAME_OVERHEAD,
    FRAME_START, MAX_FRAME_LEN, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION, RX_BUFFER_SIZE,
};
pub use line::{
    format_ack, format_boot, format_poll, format_setid, format_setid_ack, is_addressed_to,
    parse_line, parse_reply, DetectorId, LineBuffer, LineCommand, LineReply, OutLine,
    BROADCAST_ID, LINE_TERMINATOR, MAX_ID_LEN, MAX_LINE_LEN,
};
pub use messages::{PresenceState, RadioCommand, StatusReport, PING_REPLY, SET_MODE_REPLY};
