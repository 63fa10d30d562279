//! Stand-in for the radio when no module answers
//!
//! Replies are synthesized after a short random delay, and a device's
//! presence occasionally flips so the terminal's state handling gets
//! exercised without hardware.

use dtd_protocol::{PresenceState, RadioCommand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of simulated link behavior
pub trait SimulationSource {
    /// Reply latency for a command
    fn reply_delay_ms(&mut self, command: RadioCommand) -> u32;

    /// Whether a device's presence flips on this status request
    fn should_flip(&mut self) -> bool;

    /// Presence a device starts in
    fn initial_state(&mut self, id: u8) -> PresenceState;

    /// Battery percentage reported with a status reply
    fn battery(&mut self) -> u8;

    /// RSSI reported with a status reply
    fn rssi(&mut self) -> u8;
}

/// Seeded pseudo-random simulation
///
/// Ping latency is 50..=113 ms, status latency 50..=177 ms, and a status
/// request flips presence with probability 1/16.
pub struct RandomSimulation {
    rng: SmallRng,
}

impl RandomSimulation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl SimulationSource for RandomSimulation {
    fn reply_delay_ms(&mut self, command: RadioCommand) -> u32 {
        match command {
            RadioCommand::Ping => 50 + self.rng.gen_range(0..64),
            RadioCommand::GetStatus => 50 + self.rng.gen_range(0..128),
            RadioCommand::SetMode => 0,
        }
    }

    fn should_flip(&mut self) -> bool {
        self.rng.gen_range(0..16u8) == 0
    }

    fn initial_state(&mut self, _id: u8) -> PresenceState {
        PresenceState::from_present(self.rng.gen())
    }

    fn battery(&mut self) -> u8 {
        self.rng.gen_range(75..=99)
    }

    fn rssi(&mut self) -> u8 {
        self.rng.gen_range(81..=110)
    }
}

/// Simulation that never flips and answers instantly
///
/// Every device starts present.
#[derive(Debug, Default, Clone, Copy)]
pub struct SteadySimulation;

impl SimulationSource for SteadySimulation {
    fn reply_delay_ms(&mut self, _command: RadioCommand) -> u32 {
        0
    }

    fn should_flip(&mut self) -> bool {
        false
    }

    fn initial_state(&mut self, _id: u8) -> PresenceState {
        PresenceState::Present
    }

    fn battery(&mut self) -> u8 {
        100
    }

    fn rssi(&mut self) -> u8 {
        100
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    /// Scripted simulation: fixed delay, flips on chosen request numbers
    #[derive(Debug, Default)]
    pub struct ScriptedSimulation {
        pub delay_ms: u32,
        pub flips: std::vec::Vec<bool>,
        pub requests: usize,
        pub start: PresenceState,
    }

    impl SimulationSource for ScriptedSimulation {
        fn reply_delay_ms(&mut self, _command: RadioCommand) -> u32 {
            self.delay_ms
        }

        fn should_flip(&mut self) -> bool {
            let flip = self.flips.get(self.requests).copied().unwrap_or(false);
            self.requests += 1;
            flip
        }

        fn initial_state(&mut self, _id: u8) -> PresenceState {
            self.start
        }

        fn battery(&mut self) -> u8 {
            80
        }

        fn rssi(&mut self) -> u8 {
            90
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ranges() {
        let mut sim = RandomSimulation::new(12345);
        for _ in 0..500 {
            let ping = sim.reply_delay_ms(RadioCommand::Ping);
            assert!((50..=113).contains(&ping));
            let status = sim.reply_delay_ms(RadioCommand::GetStatus);
            assert!((50..=177).contains(&status));
            assert!((75..=99).contains(&sim.battery()));
            assert!((81..=110).contains(&sim.rssi()));
            assert_ne!(sim.initial_state(1), PresenceState::Unknown);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomSimulation::new(7);
        let mut b = RandomSimulation::new(7);
        for _ in 0..32 {
            assert_eq!(a.should_flip(), b.should_flip());
            assert_eq!(a.battery(), b.battery());
        }
    }
}
