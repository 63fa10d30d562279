use dtd_protocol::{PresenceState, StatusReport};
use heapless::Vec;

/// Most detectors one terminal tracks
pub const MAX_DEVICES: usize = 10;

/// Last known status of one detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub id: u8,
    pub state: PresenceState,
    /// Battery percentage, if ever reported
    pub battery: Option<u8>,
    /// Signal strength, if ever reported
    pub rssi: Option<u8>,
    pub flags: u8,
}

impl DeviceStatus {
    fn unknown(id: u8) -> Self {
        Self {
            id,
            state: PresenceState::Unknown,
            battery: None,
            rssi: None,
            flags: 0,
        }
    }
}

/// `{id, state}` pair handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSnapshot {
    pub id: u8,
    pub state: PresenceState,
}

/// Per-device request accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkCounters {
    /// Status requests issued
    pub polls: u32,
    /// Requests that got a valid reply
    pub replies: u32,
    /// Requests that exhausted their retries
    pub misses: u32,
}

#[derive(Debug, Clone)]
struct DeviceEntry {
    status: DeviceStatus,
    counters: LinkCounters,
}

/// Table of every configured detector, in configuration order
#[derive(Debug, Clone)]
pub struct DeviceTable {
    entries: Vec<DeviceEntry, MAX_DEVICES>,
}

impl DeviceTable {
    /// Build the table with every device `Unknown`
    ///
    /// Duplicate ids are kept once; ids beyond `MAX_DEVICES` are dropped
    /// (configuration validation rejects both).
    pub fn new(ids: &[u8]) -> Self {
        let mut entries: Vec<DeviceEntry, MAX_DEVICES> = Vec::new();
        for &id in ids {
            if entries.iter().any(|e| e.status.id == id) {
                continue;
            }
            let entry = DeviceEntry {
                status: DeviceStatus::unknown(id),
                counters: LinkCounters::default(),
            };
            if entries.push(entry).is_err() {
                break;
            }
        }
        Self { entries }
    }

    fn entry_mut(&mut self, id: u8) -> Option<&mut DeviceEntry> {
        self.entries.iter_mut().find(|e| e.status.id == id)
    }

    /// Store a status reply
    ///
    /// Returns `false` (and changes nothing) for an unconfigured id.
    /// Battery and RSSI keep their previous value when the reply omits them.
    pub fn apply(&mut self, id: u8, report: StatusReport) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        entry.status.state = report.state;
        if report.battery.is_some() {
            entry.status.battery = report.battery;
        }
        if report.rssi.is_some() {
            entry.status.rssi = report.rssi;
        }
        true
    }

    /// Explicitly forget a device's state
    pub fn reset(&mut self, id: u8) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.status = DeviceStatus::unknown(id);
                true
            }
            None => false,
        }
    }

    /// Account for one status request and whether it was answered
    pub fn record_poll(&mut self, id: u8, answered: bool) {
        if let Some(entry) = self.entry_mut(id) {
            let c = &mut entry.counters;
            c.polls = c.polls.wrapping_add(1);
            if answered {
                c.replies = c.replies.wrapping_add(1);
            } else {
                c.misses = c.misses.wrapping_add(1);
            }
        }
    }

    pub fn get(&self, id: u8) -> Option<&DeviceStatus> {
        self.entries
            .iter()
            .map(|e| &e.status)
            .find(|s| s.id == id)
    }

    pub fn counters(&self, id: u8) -> Option<LinkCounters> {
        self.entries
            .iter()
            .find(|e| e.status.id == id)
            .map(|e| e.counters)
    }

    pub fn contains(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    /// Configured ids in order
    pub fn ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.iter().map(|e| e.status.id)
    }

    /// Full status of every device
    pub fn statuses(&self) -> Vec<DeviceStatus, MAX_DEVICES> {
        self.entries.iter().map(|e| e.status).collect()
    }

    /// `{id, state}` of every device, for rendering
    pub fn snapshot(&self) -> Vec<DeviceSnapshot, MAX_DEVICES> {
        self.entries
            .iter()
            .map(|e| DeviceSnapshot {
                id: e.status.id,
                state: e.status.state,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
