//! Reveal countdown
//!
//! While roles are revealed the client shows a cosmetic countdown. The host
//! environment owns the actual timer: the countdown only asks for ticks via
//! a `schedule_message` callback and consumes the alarms fed back to it.
//!
//! Every start or cancel bumps a generation counter. Alarms carry the
//! generation they were scheduled under, so a tick belonging to an earlier
//! countdown is dropped instead of writing over the current one.

use serde::{Deserialize, Serialize};
use tracing::debug;
use web_time::Duration;

/// Alarm messages for the reveal countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second of the countdown has elapsed
    Tick {
        /// Generation of the countdown that scheduled this tick
        generation: u64,
    },
}

/// A restartable countdown measured in whole seconds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealCountdown {
    generation: u64,
    remaining: Option<u64>,
}

impl RevealCountdown {
    /// Starts the countdown from `seconds`, superseding any running one
    ///
    /// # Arguments
    ///
    /// * `seconds` - Value shown when the countdown starts
    /// * `tick` - Delay between two ticks
    /// * `schedule_message` - Function to schedule the next tick
    pub fn start<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        seconds: u64,
        tick: Duration,
        mut schedule_message: S,
    ) {
        self.generation += 1;
        self.remaining = Some(seconds);
        debug!(generation = self.generation, seconds, "reveal countdown started");

        if seconds > 0 {
            schedule_message(
                AlarmMessage::Tick {
                    generation: self.generation,
                }
                .into(),
                tick,
            );
        }
    }

    /// Stops the countdown; pending ticks become stale
    pub fn cancel(&mut self) {
        if self.remaining.take().is_some() {
            debug!(generation = self.generation, "reveal countdown cancelled");
        }
        self.generation += 1;
    }

    /// Seconds left, or `None` when no countdown is shown
    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }

    /// Countdown text such as `"20s"`
    pub fn label(&self) -> Option<String> {
        self.remaining.map(|seconds| format!("{seconds}s"))
    }

    /// Consumes a tick, scheduling the next one until zero is reached
    ///
    /// # Returns
    ///
    /// `true` if the tick belonged to the running countdown
    pub fn receive_alarm<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        message: &AlarmMessage,
        tick: Duration,
        mut schedule_message: S,
    ) -> bool {
        let AlarmMessage::Tick { generation } = *message;

        if generation != self.generation {
            debug!(generation, current = self.generation, "stale countdown tick dropped");
            return false;
        }

        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };

        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            schedule_message((*message).into(), tick);
        }
        true
    }
}
