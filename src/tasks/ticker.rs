//! The per-instance timer handle behind every countdown

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

/// Tick period used when nothing else is configured
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns zero or one armed interval. Never shared between gate instances.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Arm the interval; the first tick lands one full period from now.
    ///
    /// Returns `false` when an interval is already armed. Nothing new is
    /// created in that case.
    pub fn arm(&mut self) -> bool {
        if self.interval.is_some() {
            debug!("Ticker already armed, ignoring arm request");
            return false;
        }
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        true
    }

    /// Release the interval if one is armed
    pub fn disarm(&mut self) -> bool {
        self.interval.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Pends forever while disarmed, so it can sit
    /// in a `select!` next to other event sources.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_period() {
        let mut ticker = Ticker::default();
        assert!(ticker.arm());

        let early = timeout(Duration::from_millis(999), ticker.tick()).await;
        assert!(early.is_err(), "ticked before a full period elapsed");

        advance(Duration::from_millis(1)).await;
        ticker.tick().await;
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_ticker_never_ticks() {
        let mut ticker = Ticker::default();
        ticker.arm();
        assert!(ticker.disarm());
        assert!(!ticker.disarm());

        let waited = timeout(Duration::from_secs(10), ticker.tick()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn arming_twice_keeps_the_original_schedule() {
        let mut ticker = Ticker::default();
        assert!(ticker.arm());
        advance(Duration::from_millis(600)).await;
        assert!(!ticker.arm());

        // original deadline is 400ms away, a re-armed one would be 1s away
        let waited = timeout(Duration::from_millis(500), ticker.tick()).await;
        assert!(waited.is_ok());
    }
}
