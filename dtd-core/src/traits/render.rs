//! Consumer of device-state snapshots

use crate::device::DeviceSnapshot;

/// Errors reported by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// Output device did not accept the update
    Io,
    /// More devices than the renderer can lay out
    Overflow,
}

/// Presentation layer for the terminal
///
/// Called once per loop iteration with every configured device, in
/// configuration order. A failure is counted by the caller and the loop
/// carries on.
pub trait StatusRenderer {
    fn render(&mut self, devices: &[DeviceSnapshot]) -> Result<(), RenderError>;

    /// Show or clear the device currently under focused test
    fn set_focus(&mut self, _focus: Option<u8>) -> Result<(), RenderError> {
        Ok(())
    }
}
