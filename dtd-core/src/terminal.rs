//! One iteration of the terminal control loop
//!
//! The firmware calls [`TerminalApp::run_iteration`] from its main task
//! and sleeps for the returned number of milliseconds. That sleep is the
//! only point where the loop yields.

use crate::config::TerminalConfig;
use crate::link::{LinkStats, RadioLink, SimulationSource, Transport};
use crate::traits::{Clock, StatusRenderer};
use crate::watchdog::WatchdogState;
use crate::PresenceState;

/// Terminal loop state: link, renderer and bookkeeping
pub struct TerminalApp<'w, T, C, S, R> {
    link: RadioLink<T, C, S>,
    renderer: R,
    watchdog: &'w WatchdogState,
    testing: Option<u8>,
    idle_wait_ms: u32,
    testing_wait_ms: u32,
    loop_count: u32,
    error_count: u32,
}

impl<'w, T, C, S, R> TerminalApp<'w, T, C, S, R>
where
    T: Transport,
    C: Clock,
    S: SimulationSource,
    R: StatusRenderer,
{
    pub fn new(
        link: RadioLink<T, C, S>,
        renderer: R,
        watchdog: &'w WatchdogState,
        config: &TerminalConfig,
    ) -> Self {
        Self {
            link,
            renderer,
            watchdog,
            testing: None,
            idle_wait_ms: config.loop_wait_ms(false),
            testing_wait_ms: config.loop_wait_ms(true),
            loop_count: 0,
            error_count: 0,
        }
    }

    /// Run one loop iteration; returns how long to wait before the next
    ///
    /// The watchdog is fed before any link traffic so a stall anywhere in
    /// the iteration is caught. Render failures are counted and the loop
    /// carries on.
    pub fn run_iteration(&mut self) -> u32 {
        self.watchdog.feed(self.link.clock().now_ms());
        self.loop_count = self.loop_count.wrapping_add(1);

        self.link.poll_all();

        let snapshot = self.link.devices().snapshot();
        if let Err(_e) = self.renderer.render(&snapshot) {
            warn!("terminal: render failed: {:?}", _e);
            self.error_count = self.error_count.wrapping_add(1);
        }

        match self.testing {
            Some(id) => {
                let _state = self.link.request_status(id);
                debug!("terminal: test target {} is {:?}", id, _state);
                self.testing_wait_ms
            }
            None => self.idle_wait_ms,
        }
    }

    /// Focus one device for testing, or clear the focus
    pub fn set_testing(&mut self, target: Option<u8>) {
        if self.testing == target {
            return;
        }
        if let Some(_id) = target {
            info!("terminal: testing device {}", _id);
        } else {
            info!("terminal: testing stopped");
        }
        self.testing = target;
        if let Err(_e) = self.renderer.set_focus(target) {
            warn!("terminal: focus update failed: {:?}", _e);
            self.error_count = self.error_count.wrapping_add(1);
        }
    }

    pub fn testing(&self) -> Option<u8> {
        self.testing
    }

    /// Completed loop iterations
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Iterations that hit a recoverable error
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn stats(&self) -> &LinkStats {
        self.link.stats()
    }

    /// Last known state of one device
    pub fn device_state(&self, id: u8) -> PresenceState {
        self.link
            .devices()
            .get(id)
            .map(|status| status.state)
            .unwrap_or(PresenceState::Unknown)
    }

    pub fn link(&self) -> &RadioLink<T, C, S> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut RadioLink<T, C, S> {
        &mut self.link
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
