//! Input source for the host's own player.
//!
//! The host binary has no window, so its player follows a fixed script:
//! hold one direction and optionally jump at a fixed cadence. The script
//! feeds the tick loop through a [`HostHandle`] like any other event.

use crate::network::HostHandle;
use log::debug;
use shared::{Horizontal, InputState};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalScript {
    pub direction: Horizontal,
    /// Jump every this many samples; 0 never jumps.
    pub jump_every: u32,
}

impl LocalScript {
    pub fn new(direction: Horizontal, jump_every: u32) -> Self {
        Self {
            direction,
            jump_every,
        }
    }

    /// Input for the `sample`th reading.
    pub fn input_at(&self, sample: u64) -> InputState {
        let jump = self.jump_every > 0 && sample % u64::from(self.jump_every) == 0;
        InputState::new(self.direction, jump)
    }
}

/// Feeds the script to the host once per `period` until the host stops.
pub async fn drive(handle: HostHandle, script: LocalScript, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut sample = 0u64;
    loop {
        ticker.tick().await;
        if !handle.set_local_input(script.input_at(sample)) {
            break;
        }
        sample += 1;
    }

    debug!("Local input stopped after {} samples", sample);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_holds_direction() {
        let script = LocalScript::new(Horizontal::Left, 0);
        for sample in 0..10 {
            let input = script.input_at(sample);
            assert_eq!(input.horizontal, Horizontal::Left);
            assert!(!input.jump);
        }
    }

    #[test]
    fn test_script_jumps_on_cadence() {
        let script = LocalScript::new(Horizontal::Neutral, 30);
        let jumps: Vec<u64> = (0..100).filter(|&s| script.input_at(s).jump).collect();
        assert_eq!(jumps, vec![0, 30, 60, 90]);
    }

    #[test]
    fn test_default_script_is_idle() {
        assert_eq!(LocalScript::default().input_at(0), InputState::default());
    }
}
