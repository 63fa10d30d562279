//! Log-backed status renderer
//!
//! Stands in for the terminal's display: every detector whose state
//! changed since the previous frame gets one log line.

use dtd_core::device::{DeviceSnapshot, MAX_DEVICES};
use dtd_core::traits::{RenderError, StatusRenderer};
use dtd_core::PresenceState;
use defmt::*;
use heapless::Vec;

/// Renderer with per-device dirty tracking
pub struct LogRenderer {
    shown: Vec<DeviceSnapshot, MAX_DEVICES>,
    focus: Option<u8>,
}

impl LogRenderer {
    pub const fn new() -> Self {
        Self {
            shown: Vec::new(),
            focus: None,
        }
    }

    fn draw(device: &DeviceSnapshot) {
        info!("DD {=u8}: {}", device.id, state_label(device.state));
    }
}

fn state_label(state: PresenceState) -> &'static str {
    match state {
        PresenceState::Present => "PRESENT",
        PresenceState::Absent => "ABSENT",
        PresenceState::Unknown => "?",
    }
}

impl StatusRenderer for LogRenderer {
    fn render(&mut self, devices: &[DeviceSnapshot]) -> Result<(), RenderError> {
        // Layout changed: redraw everything
        if self.shown.len() != devices.len() {
            self.shown = Vec::from_slice(devices).map_err(|_| RenderError::Overflow)?;
            devices.iter().for_each(Self::draw);
            return Ok(());
        }

        for (shown, device) in self.shown.iter_mut().zip(devices) {
            if shown != device {
                Self::draw(device);
                *shown = *device;
            }
        }
        Ok(())
    }

    fn set_focus(&mut self, focus: Option<u8>) -> Result<(), RenderError> {
        if self.focus != focus {
            match focus {
                Some(id) => info!("Testing DD {=u8}", id),
                None => info!("Testing idle"),
            }
            self.focus = focus;
        }
        Ok(())
    }
}
