//! Request/response exchange engine
//!
//! One exchange writes a frame and waits for the first valid frame back.
//! Waiting is a blocking poll of the transport: nothing here yields to
//! the scheduler, so a full retry sequence can hold the CPU for
//! [`RetryPolicy::worst_case_ms`].

use dtd_protocol::{
    encode_frame, Frame, PresenceState, RadioCommand, RxBuffer, StatusReport, PING_REPLY,
    SET_MODE_REPLY,
};
use heapless::Vec;

use super::retry::RetryPolicy;
use super::simulation::SimulationSource;
use super::stats::LinkStats;
use super::transport::Transport;
use crate::config::TerminalConfig;
use crate::device::{DeviceStatus, DeviceTable, MAX_DEVICES};
use crate::traits::Clock;

/// Receive poll interval while waiting for a reply
pub const RX_POLL_INTERVAL_MS: u32 = 5;

/// PINGs sent by [`RadioLink::probe_hardware`]
pub const PROBE_ATTEMPTS: u8 = 3;

/// Pause between probe PINGs
pub const PROBE_INTERVAL_MS: u32 = 100;

/// Target byte used for module-level commands
const MODULE_TARGET: u8 = 0;

/// How exchanges are carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMode {
    /// Frames go over the transport
    Physical,
    /// Replies are synthesized locally
    Simulated,
}

/// Terminal-side radio link
///
/// Owns the transport, the device table and the statistics. Callers must
/// not interleave exchanges for the same target: the first valid frame
/// received is taken as the reply, whichever request it answers.
pub struct RadioLink<T, C, S> {
    transport: Option<T>,
    clock: C,
    sim: S,
    mode: LinkMode,
    retry: RetryPolicy,
    reply_timeout_ms: u32,
    poll_period_ms: u32,
    stats: LinkStats,
    rx: RxBuffer,
    sim_states: Vec<(u8, PresenceState), MAX_DEVICES>,
    devices: DeviceTable,
    last_sweep_ms: Option<u32>,
}

impl<T, C, S> RadioLink<T, C, S>
where
    T: Transport,
    C: Clock,
    S: SimulationSource,
{
    /// Build a link for the configured devices
    ///
    /// The link runs simulated when configured to, or when no transport
    /// is available.
    pub fn new(transport: Option<T>, clock: C, mut sim: S, config: &TerminalConfig) -> Self {
        let mode = if config.simulate || transport.is_none() {
            LinkMode::Simulated
        } else {
            LinkMode::Physical
        };

        let devices = DeviceTable::new(&config.device_ids);
        let sim_states = devices
            .ids()
            .map(|id| (id, sim.initial_state(id)))
            .collect();

        if mode == LinkMode::Simulated {
            info!("radio link: simulation mode");
        }

        Self {
            transport,
            clock,
            sim,
            mode,
            retry: config.retry,
            reply_timeout_ms: config.reply_timeout_ms,
            poll_period_ms: config.poll_period_ms,
            stats: LinkStats::new(),
            rx: RxBuffer::new(),
            sim_states,
            devices,
            last_sweep_ms: None,
        }
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn devices(&self) -> &DeviceTable {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut DeviceTable {
        &mut self.devices
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn poll_period_ms(&self) -> u32 {
        self.poll_period_ms
    }

    /// Force simulated operation
    pub fn fall_back_to_simulation(&mut self) {
        if self.mode != LinkMode::Simulated {
            warn!("radio link: switching to simulation");
            self.mode = LinkMode::Simulated;
        }
    }

    /// One request and at most one reply
    ///
    /// Returns `None` when no valid frame arrives within `timeout_ms`.
    /// Transport errors are counted and otherwise ignored.
    pub fn exchange(
        &mut self,
        command: RadioCommand,
        target: u8,
        payload: &[u8],
        timeout_ms: u32,
    ) -> Option<Frame> {
        let reply = match self.mode {
            LinkMode::Simulated => self.exchange_simulated(command, target, timeout_ms),
            LinkMode::Physical => self.exchange_physical(command, target, payload, timeout_ms),
        };
        if reply.is_none() {
            self.stats.record_attempt_failure();
        }
        reply
    }

    fn exchange_physical(
        &mut self,
        command: RadioCommand,
        target: u8,
        payload: &[u8],
        timeout_ms: u32,
    ) -> Option<Frame> {
        let bytes = match encode_frame(command.as_u8(), target, payload) {
            Ok(bytes) => bytes,
            Err(_e) => {
                error!("radio link: cannot encode {:?}: {:?}", command, _e);
                return None;
            }
        };

        let transport = self.transport.as_mut()?;

        match transport.send(&bytes) {
            Ok(n) if n == bytes.len() => self.stats.update_tx(true),
            Ok(_n) => {
                warn!("radio link: short write ({} of {})", _n, bytes.len());
                self.stats.update_tx(false);
            }
            Err(_e) => {
                error!("radio link: write failed: {:?}", defmt::Debug2Format(&_e));
                self.stats.update_tx(false);
            }
        }

        let start = self.clock.now_ms();
        let mut chunk = [0u8; 32];
        loop {
            match transport.receive(&mut chunk) {
                Ok(0) => {}
                Ok(n) => self.rx.push(&chunk[..n]),
                Err(_e) => {
                    warn!("radio link: read failed: {:?}", defmt::Debug2Format(&_e));
                    self.stats.update_rx(false, None);
                }
            }

            if let Some(frame) = self.rx.take_frame() {
                self.stats.update_rx(true, reply_rssi(&frame));
                return Some(frame);
            }

            if self.clock.elapsed_since(start) >= timeout_ms {
                return None;
            }
            self.clock.delay_ms(RX_POLL_INTERVAL_MS);
        }
    }

    fn exchange_simulated(
        &mut self,
        command: RadioCommand,
        target: u8,
        timeout_ms: u32,
    ) -> Option<Frame> {
        self.stats.update_tx(true);
        let delay = self.sim.reply_delay_ms(command);
        if delay > timeout_ms {
            self.clock.delay_ms(timeout_ms);
            return None;
        }
        self.clock.delay_ms(delay);

        let frame = match command {
            RadioCommand::Ping => Frame::new(command.as_u8(), target, PING_REPLY).ok()?,
            RadioCommand::SetMode => Frame::new(command.as_u8(), target, SET_MODE_REPLY).ok()?,
            RadioCommand::GetStatus => {
                let flip = self.sim.should_flip();
                let state = match self.sim_states.iter_mut().find(|(id, _)| *id == target) {
                    Some((_, state)) => {
                        if flip && *state != PresenceState::Unknown {
                            *state = state.toggled();
                        }
                        *state
                    }
                    None => PresenceState::Unknown,
                };
                let report = StatusReport {
                    state,
                    battery: Some(self.sim.battery()),
                    rssi: Some(self.sim.rssi()),
                };
                Frame::new(command.as_u8(), target, &report.to_payload()).ok()?
            }
        };

        self.stats.update_rx(true, reply_rssi(&frame));
        Some(frame)
    }

    /// [`exchange`](Self::exchange) with bounded retries
    ///
    /// Attempt `n` waits [`RetryPolicy::timeout_for_attempt`]`(n)`; failed
    /// attempts are followed by the policy's backoff. Exhausting every
    /// attempt counts one timeout.
    pub fn exchange_with_retry(
        &mut self,
        command: RadioCommand,
        target: u8,
        payload: &[u8],
    ) -> Option<Frame> {
        let policy = self.retry;
        let attempts = policy.max_attempts.max(1);

        for attempt in 0..attempts {
            let timeout = policy.timeout_for_attempt(attempt);
            if let Some(reply) = self.exchange(command, target, payload, timeout) {
                return Some(reply);
            }
            debug!(
                "radio link: attempt {}/{} failed for {}",
                attempt + 1,
                attempts,
                target
            );

            let backoff = policy.backoff_after_attempt(attempt);
            if backoff > 0 {
                self.clock.delay_ms(backoff);
            }
        }

        warn!("radio link: no reply from {} after {} attempts", target, attempts);
        self.stats.update_timeout();
        None
    }

    /// Request and store the status of one configured device
    ///
    /// A reply carrying no presence reading counts as a miss and leaves
    /// the stored state alone; only [`DeviceTable::reset`] forgets it.
    fn refresh(&mut self, id: u8) -> Option<StatusReport> {
        let report = self
            .exchange_with_retry(RadioCommand::GetStatus, id, &[])
            .filter(|frame| frame.command == RadioCommand::GetStatus.as_u8())
            .and_then(|frame| StatusReport::from_payload(&frame.payload))
            .filter(|report| report.state != PresenceState::Unknown);

        self.devices.record_poll(id, report.is_some());
        if let Some(report) = report {
            self.devices.apply(id, report);
        }
        report
    }

    /// Refresh every device if a sweep is due, then report all statuses
    ///
    /// A sweep runs on the first call and whenever the poll period has
    /// elapsed since the previous sweep started. Devices that do not
    /// answer keep their last known state.
    pub fn poll_all(&mut self) -> Vec<DeviceStatus, MAX_DEVICES> {
        let now = self.clock.now_ms();
        let due = match self.last_sweep_ms {
            None => true,
            Some(last) => now.wrapping_sub(last) >= self.poll_period_ms,
        };

        if due {
            self.last_sweep_ms = Some(now);
            let ids: Vec<u8, MAX_DEVICES> = self.devices.ids().collect();
            for id in ids {
                self.refresh(id);
            }
        }

        self.devices.statuses()
    }

    /// Status of a single device, requested now
    ///
    /// Without a usable reply the last known state is reported.
    /// Unconfigured ids report `Unknown` without any traffic.
    pub fn request_status(&mut self, id: u8) -> PresenceState {
        if !self.devices.contains(id) {
            return PresenceState::Unknown;
        }
        self.refresh(id);
        self.devices
            .get(id)
            .map(|status| status.state)
            .unwrap_or(PresenceState::Unknown)
    }

    /// Single PING to the radio module
    pub fn ping(&mut self) -> bool {
        let timeout = self.reply_timeout_ms;
        self.exchange(RadioCommand::Ping, MODULE_TARGET, &[], timeout)
            .is_some_and(|reply| {
                reply.command == RadioCommand::Ping.as_u8() && reply.payload[..] == *PING_REPLY
            })
    }

    /// Ask `target` to change operating mode
    pub fn set_remote_mode(&mut self, target: u8, mode: u8) -> bool {
        self.exchange_with_retry(RadioCommand::SetMode, target, &[mode])
            .is_some_and(|reply| {
                reply.command == RadioCommand::SetMode.as_u8()
                    && reply.payload[..] == *SET_MODE_REPLY
            })
    }

    /// Check that a radio module answers, falling back to simulation
    ///
    /// Sends up to [`PROBE_ATTEMPTS`] PINGs. Always succeeds when already
    /// simulated.
    pub fn probe_hardware(&mut self) -> bool {
        if self.mode == LinkMode::Simulated {
            return true;
        }

        for attempt in 0..PROBE_ATTEMPTS {
            if self.ping() {
                info!("radio link: module detected");
                return true;
            }
            if attempt + 1 < PROBE_ATTEMPTS {
                self.clock.delay_ms(PROBE_INTERVAL_MS);
            }
        }

        error!("radio link: module not found");
        self.fall_back_to_simulation();
        false
    }
}

fn reply_rssi(frame: &Frame) -> Option<u8> {
    if frame.command != RadioCommand::GetStatus.as_u8() {
        return None;
    }
    StatusReport::from_payload(&frame.payload).and_then(|report| report.rssi)
}
