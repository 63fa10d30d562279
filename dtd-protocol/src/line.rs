//! Textual line protocol spoken by detector nodes
//!
//! Every message is one ASCII line of colon-separated fields ending with a
//! single `\n`. Requests flow terminal → detector, replies the other way:
//!
//! | Line | Direction | Meaning |
//! |---|---|---|
//! | `POLL:<id>` | → DD | sample presence if `<id>` is mine or `ALL` |
//! | `SETID:<id>` | → DD | persist and adopt a new identifier |
//! | `ACK:<id>:<0\|1>` | ← DD | presence sample |
//! | `ACKSETID:<id>:<OK\|ERR>` | ← DD | identity change result |
//! | `BOOT:<id>` | ← DD | sent once after reset |

use core::fmt::{self, Write};
use heapless::{String, Vec};

/// Line terminator byte
pub const LINE_TERMINATOR: u8 = b'\n';

/// Maximum detector identifier length
pub const MAX_ID_LEN: usize = 8;

/// Poll target addressing every detector (matched case-insensitively)
pub const BROADCAST_ID: &str = "ALL";

/// Maximum buffered line length, terminator excluded
pub const MAX_LINE_LEN: usize = 64;

/// Capacity of a formatted outgoing line
pub const OUT_LINE_LEN: usize = 32;

/// A formatted outgoing line, terminator included
pub type OutLine = String<OUT_LINE_LEN>;

/// Detector identifier: 1 to 8 printable ASCII characters, no `:`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectorId(String<MAX_ID_LEN>);

impl DetectorId {
    /// Validate and copy an identifier
    pub fn new(id: &str) -> Option<Self> {
        if id.is_empty() || id.len() > MAX_ID_LEN {
            return None;
        }
        if !id.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
            return None;
        }
        let mut s = String::new();
        s.push_str(id).ok()?;
        Some(Self(s))
    }

    /// Two-digit numeric identifier (`7` → `"07"`), modulo 100
    pub fn from_number(n: u8) -> Self {
        let n = n % 100;
        let mut s = String::new();
        // Two ASCII digits always fit
        let _ = s.push((b'0' + n / 10) as char);
        let _ = s.push((b'0' + n % 10) as char);
        Self(s)
    }

    /// Decode an identifier from raw persisted bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        core::str::from_utf8(bytes).ok().and_then(Self::new)
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Borrow as raw bytes (what gets persisted)
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requests understood by a detector
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineCommand<'a> {
    /// Presence poll for `target` (an id or the broadcast token)
    Poll { target: &'a str },
    /// Identity change request
    SetId { id: DetectorId },
}

/// Replies produced by a detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineReply<'a> {
    /// Presence sample
    Ack { id: &'a str, present: bool },
    /// Identity change result
    SetIdAck { id: &'a str, ok: bool },
    /// Startup announcement
    Boot { id: &'a str },
}

/// Parse one request line (terminator optional)
///
/// Returns `None` for non-UTF-8 input, unknown verbs, and SETID
/// identifiers that are not valid [`DetectorId`]s. POLL targets are not
/// length-checked: a target that cannot be ours is simply not addressed.
pub fn parse_line(line: &[u8]) -> Option<LineCommand<'_>> {
    let s = core::str::from_utf8(line).ok()?.trim();

    if let Some(target) = s.strip_prefix("POLL:") {
        return Some(LineCommand::Poll {
            target: target.trim(),
        });
    }
    if let Some(id) = s.strip_prefix("SETID:") {
        return DetectorId::new(id.trim()).map(|id| LineCommand::SetId { id });
    }
    None
}

/// Parse one reply line (terminator optional)
pub fn parse_reply(line: &[u8]) -> Option<LineReply<'_>> {
    let s = core::str::from_utf8(line).ok()?.trim();
    let (verb, rest) = s.split_once(':')?;

    match verb {
        "ACK" => {
            let (id, flag) = rest.split_once(':')?;
            let present = match flag {
                "1" => true,
                "0" => false,
                _ => return None,
            };
            Some(LineReply::Ack { id, present })
        }
        "ACKSETID" => {
            let (id, result) = rest.split_once(':')?;
            let ok = match result {
                "OK" => true,
                "ERR" => false,
                _ => return None,
            };
            Some(LineReply::SetIdAck { id, ok })
        }
        "BOOT" if !rest.is_empty() => Some(LineReply::Boot { id: rest }),
        _ => None,
    }
}

/// Check whether a poll target addresses the detector `own`
pub fn is_addressed_to(target: &str, own: &DetectorId) -> bool {
    target == own.as_str() || target.eq_ignore_ascii_case(BROADCAST_ID)
}

fn format_line(args: fmt::Arguments<'_>) -> OutLine {
    let mut out = OutLine::new();
    // Every field is a DetectorId (<= 8 bytes), so the longest line fits.
    let _ = out.write_fmt(args);
    out
}

/// `ACK:<id>:<0|1>\n`
pub fn format_ack(id: &DetectorId, present: bool) -> OutLine {
    format_line(format_args!("ACK:{}:{}\n", id, u8::from(present)))
}

/// `ACKSETID:<id>:<OK|ERR>\n`
pub fn format_setid_ack(id: &DetectorId, ok: bool) -> OutLine {
    format_line(format_args!(
        "ACKSETID:{}:{}\n",
        id,
        if ok { "OK" } else { "ERR" }
    ))
}

/// `BOOT:<id>\n`
pub fn format_boot(id: &DetectorId) -> OutLine {
    format_line(format_args!("BOOT:{}\n", id))
}

/// `POLL:<target>\n`
pub fn format_poll(target: &DetectorId) -> OutLine {
    format_line(format_args!("POLL:{}\n", target))
}

/// `SETID:<id>\n`
pub fn format_setid(id: &DetectorId) -> OutLine {
    format_line(format_args!("SETID:{}\n", id))
}

/// Accumulates bytes into terminator-delimited lines
///
/// Partial lines are kept across reads. A line longer than the buffer is
/// dropped in full, including its tail up to the next terminator, and
/// counted as an overflow.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer<const N: usize = MAX_LINE_LEN> {
    buf: Vec<u8, N>,
    discarding: bool,
    overflows: u32,
}

impl<const N: usize> LineBuffer<N> {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
            overflows: 0,
        }
    }

    /// Feed a single byte
    ///
    /// Returns the completed line (terminator stripped) when `byte` is the
    /// terminator.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8, N>> {
        if byte == LINE_TERMINATOR {
            if self.discarding {
                self.discarding = false;
                return None;
            }
            return Some(core::mem::take(&mut self.buf));
        }

        if self.discarding {
            return None;
        }

        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.discarding = true;
            self.overflows = self.overflows.saturating_add(1);
        }
        None
    }

    /// Number of oversized lines dropped
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Number of bytes of the current partial line
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> DetectorId {
        DetectorId::new(s).unwrap()
    }

    #[test]
    fn test_detector_id_bounds() {
        assert!(DetectorId::new("").is_none());
        assert!(DetectorId::new("1").is_some());
        assert!(DetectorId::new("12345678").is_some());
        assert!(DetectorId::new("123456789").is_none());
        assert!(DetectorId::new("A B").is_none());
        assert!(DetectorId::new("A:B").is_none());
        assert_eq!(DetectorId::from_bytes(b"02"), Some(id("02")));
        assert_eq!(DetectorId::from_bytes(&[0xFF, 0xFE]), None);
        assert_eq!(DetectorId::from_number(7), id("07"));
        assert_eq!(DetectorId::from_number(42), id("42"));
    }

    #[test]
    fn test_parse_poll() {
        assert_eq!(
            parse_line(b"POLL:02\n"),
            Some(LineCommand::Poll { target: "02" })
        );
        assert_eq!(
            parse_line(b"POLL:ALL\r\n"),
            Some(LineCommand::Poll { target: "ALL" })
        );
    }

    #[test]
    fn test_parse_setid_length() {
        assert_eq!(parse_line(b"SETID:123456789\n"), None);
        assert_eq!(
            parse_line(b"SETID:AB\n"),
            Some(LineCommand::SetId { id: id("AB") })
        );
        assert_eq!(parse_line(b"SETID:\n"), None);
    }

    #[test]
    fn test_parse_unknown_verb() {
        assert_eq!(parse_line(b"RESET:01\n"), None);
        assert_eq!(parse_line(b"poll:01\n"), None);
        assert_eq!(parse_line(&[0xC3, 0x28, b'\n']), None);
    }

    #[test]
    fn test_format_replies() {
        assert_eq!(format_ack(&id("02"), true).as_str(), "ACK:02:1\n");
        assert_eq!(format_ack(&id("02"), false).as_str(), "ACK:02:0\n");
        assert_eq!(
            format_setid_ack(&id("12345678"), false).as_str(),
            "ACKSETID:12345678:ERR\n"
        );
        assert_eq!(format_setid_ack(&id("AB"), true).as_str(), "ACKSETID:AB:OK\n");
        assert_eq!(format_boot(&id("01")).as_str(), "BOOT:01\n");
        assert_eq!(format_poll(&id("ALL")).as_str(), "POLL:ALL\n");
        assert_eq!(format_setid(&id("07")).as_str(), "SETID:07\n");
    }

    #[test]
    fn test_parse_replies() {
        assert_eq!(
            parse_reply(b"ACK:02:1\n"),
            Some(LineReply::Ack { id: "02", present: true })
        );
        assert_eq!(
            parse_reply(b"ACKSETID:AB:ERR\n"),
            Some(LineReply::SetIdAck { id: "AB", ok: false })
        );
        assert_eq!(parse_reply(b"BOOT:01\n"), Some(LineReply::Boot { id: "01" }));
        assert_eq!(parse_reply(b"ACK:02:2\n"), None);
        assert_eq!(parse_reply(b"NOPE\n"), None);
    }

    #[test]
    fn test_addressing() {
        let own = id("02");
        assert!(is_addressed_to("02", &own));
        assert!(is_addressed_to("ALL", &own));
        assert!(is_addressed_to("all", &own));
        assert!(!is_addressed_to("99", &own));
        assert!(!is_addressed_to("", &own));
    }

    #[test]
    fn test_line_buffer_across_reads() {
        let mut lines: LineBuffer = LineBuffer::new();
        let mut out = std::vec::Vec::new();

        for &b in b"POL" {
            if let Some(line) = lines.feed(b) {
                out.push(line);
            }
        }
        assert!(out.is_empty());
        assert_eq!(lines.pending(), 3);

        for &b in b"L:01\nSETID:AB\n" {
            if let Some(line) = lines.feed(b) {
                out.push(line);
            }
        }
        assert_eq!(out.len(), 2);
        assert_eq!(&out[0][..], b"POLL:01");
        assert_eq!(&out[1][..], b"SETID:AB");
    }

    #[test]
    fn test_line_buffer_drops_oversized_line() {
        let mut lines: LineBuffer<8> = LineBuffer::new();
        let mut out = std::vec::Vec::new();

        for &b in b"POLL:0123456789\nPOLL:01\n" {
            if let Some(line) = lines.feed(b) {
                out.push(line);
            }
        }

        assert_eq!(lines.overflows(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(&out[0][..], b"POLL:01");
    }
}
