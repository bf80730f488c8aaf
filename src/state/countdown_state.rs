//! Countdown state structure and management

use serde::{Deserialize, Serialize};

/// Initial value used by both gate variants
pub const DEFAULT_COUNTDOWN: u32 = 3;

/// Outcome of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not running; nothing changed
    Idle,
    /// The countdown advanced and is still running
    Remaining(u32),
    /// The countdown reached zero and stopped itself
    Completed,
}

/// One live countdown: armed by `start`, advanced by `tick`, released by
/// `cancel` or by completing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    /// Create an idle countdown showing its initial value
    pub fn new(initial: u32) -> Self {
        Self {
            initial,
            remaining: initial,
            running: false,
        }
    }

    /// Arm the countdown at its initial value.
    ///
    /// Returns `false` without touching anything when already running;
    /// re-arming requires an explicit `cancel` first.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.remaining = self.initial;
        self.running = true;
        true
    }

    /// Advance by one period
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Completed
        } else {
            Tick::Remaining(self.remaining)
        }
    }

    /// Stop a running countdown and restore the visible counter.
    ///
    /// Idempotent: a countdown that is not running is left untouched.
    /// Returns whether a running countdown was stopped.
    pub fn cancel(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.remaining = self.initial;
        true
    }

    /// Return to the freshly created state regardless of the current one
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.initial;
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_down_to_completion_once() {
        let mut countdown = Countdown::new(3);
        assert!(countdown.start());

        assert_eq!(countdown.tick(), Tick::Remaining(2));
        assert_eq!(countdown.tick(), Tick::Remaining(1));
        assert_eq!(countdown.tick(), Tick::Completed);
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_running());

        // nothing after completion
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn cancel_when_idle_changes_nothing() {
        let mut fresh = Countdown::new(3);
        let before = fresh.clone();
        assert!(!fresh.cancel());
        assert_eq!(fresh, before);

        let mut finished = Countdown::new(1);
        finished.start();
        assert_eq!(finished.tick(), Tick::Completed);
        let before = finished.clone();
        assert!(!finished.cancel());
        assert!(!finished.cancel());
        assert_eq!(finished, before);
    }

    #[test]
    fn cancel_restores_initial_value() {
        let mut countdown = Countdown::new(3);
        countdown.start();
        countdown.tick();
        assert!(countdown.cancel());
        assert_eq!(countdown.remaining(), 3);
        assert!(!countdown.is_running());
        assert_eq!(countdown.tick(), Tick::Idle);
    }

    #[test]
    fn start_while_running_is_not_a_restart() {
        let mut countdown = Countdown::new(3);
        assert!(countdown.start());
        countdown.tick();
        assert!(!countdown.start());
        assert_eq!(countdown.remaining(), 2);

        assert_eq!(countdown.tick(), Tick::Remaining(1));
        assert_eq!(countdown.tick(), Tick::Completed);
        assert_eq!(countdown.tick(), Tick::Idle);
    }

    #[test]
    fn zero_initial_completes_on_first_tick() {
        let mut countdown = Countdown::new(0);
        assert!(countdown.start());
        assert_eq!(countdown.tick(), Tick::Completed);
    }
}
