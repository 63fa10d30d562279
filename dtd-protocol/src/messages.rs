//! Binary link commands and status payloads

/// Reply payload to a PING
pub const PING_REPLY: &[u8] = b"OK";

/// Reply payload to a SET_MODE
pub const SET_MODE_REPLY: &[u8] = b"ACK";

/// Command byte of a binary frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RadioCommand {
    /// Link check, answered with `OK`
    Ping = 0x10,
    /// Presence/status request
    GetStatus = 0x20,
    /// Operating mode change
    SetMode = 0x30,
}

impl RadioCommand {
    /// Parse a command byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x10 => Some(Self::Ping),
            0x20 => Some(Self::GetStatus),
            0x30 => Some(Self::SetMode),
            _ => None,
        }
    }

    /// Wire byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Presence state of a detector
///
/// `Unknown` until a valid status reply has been received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PresenceState {
    #[default]
    Unknown = 0,
    Present = 1,
    Absent = 2,
}

impl PresenceState {
    /// Decode a status byte
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Present),
            2 => Some(Self::Absent),
            _ => None,
        }
    }

    /// Status byte
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Map a sampled boolean
    pub fn from_present(present: bool) -> Self {
        if present {
            Self::Present
        } else {
            Self::Absent
        }
    }

    /// Swap Present and Absent; Unknown stays Unknown
    pub fn toggled(self) -> Self {
        match self {
            Self::Present => Self::Absent,
            Self::Absent => Self::Present,
            Self::Unknown => Self::Unknown,
        }
    }
}

/// Payload of a GET_STATUS reply
///
/// Byte 0 is the presence state; battery percentage and RSSI follow when
/// the detector reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub state: PresenceState,
    pub battery: Option<u8>,
    pub rssi: Option<u8>,
}

impl StatusReport {
    /// Report carrying only a presence state
    pub fn new(state: PresenceState) -> Self {
        Self {
            state,
            battery: None,
            rssi: None,
        }
    }

    /// Decode a reply payload (1 to 3 bytes)
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.is_empty() || payload.len() > 3 {
            return None;
        }
        Some(Self {
            state: PresenceState::from_byte(payload[0])?,
            battery: payload.get(1).copied(),
            rssi: payload.get(2).copied(),
        })
    }

    /// Encode into a reply payload
    ///
    /// RSSI is only sent alongside a battery byte since fields are
    /// positional.
    pub fn to_payload(&self) -> heapless::Vec<u8, 3> {
        let mut out = heapless::Vec::new();
        let _ = out.push(self.state.as_byte());
        if let Some(battery) = self.battery {
            let _ = out.push(battery);
            if let Some(rssi) = self.rssi {
                let _ = out.push(rssi);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes() {
        assert_eq!(RadioCommand::from_u8(0x10), Some(RadioCommand::Ping));
        assert_eq!(RadioCommand::from_u8(0x20), Some(RadioCommand::GetStatus));
        assert_eq!(RadioCommand::from_u8(0x30), Some(RadioCommand::SetMode));
        assert_eq!(RadioCommand::from_u8(0x40), None);
        assert_eq!(RadioCommand::GetStatus.as_u8(), 0x20);
    }

    #[test]
    fn test_presence_bytes() {
        assert_eq!(PresenceState::default(), PresenceState::Unknown);
        assert_eq!(PresenceState::from_byte(1), Some(PresenceState::Present));
        assert_eq!(PresenceState::from_byte(3), None);
        assert_eq!(PresenceState::Absent.as_byte(), 2);
        assert_eq!(PresenceState::Present.toggled(), PresenceState::Absent);
        assert_eq!(PresenceState::Unknown.toggled(), PresenceState::Unknown);
    }

    #[test]
    fn test_status_payload() {
        let full = StatusReport::from_payload(&[1, 80, 95]).unwrap();
        assert_eq!(full.state, PresenceState::Present);
        assert_eq!(full.battery, Some(80));
        assert_eq!(full.rssi, Some(95));
        assert_eq!(&full.to_payload()[..], &[1, 80, 95]);

        let bare = StatusReport::from_payload(&[2]).unwrap();
        assert_eq!(bare, StatusReport::new(PresenceState::Absent));
        assert_eq!(&bare.to_payload()[..], &[2]);

        assert!(StatusReport::from_payload(&[]).is_none());
        assert!(StatusReport::from_payload(&[7]).is_none());
        assert!(StatusReport::from_payload(&[1, 2, 3, 4]).is_none());
    }
}
