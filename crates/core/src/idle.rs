//! Inactivity tracking
//!
//! The monitor's counter is the only record of idle time. Callers feed it
//! activity events and periodic ticks; it reports when the idle limit has
//! been reached.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    LoggedOut,
}

#[derive(Debug, Clone)]
pub struct IdleMonitor {
    elapsed: Duration,
    limit: Duration,
    tick: Duration,
    state: IdleState,
}

impl IdleMonitor {
    pub fn new(limit: Duration, tick: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            limit,
            tick,
            state: IdleState::LoggedOut,
        }
    }

    /// User did something; the idle counter restarts
    pub fn record_activity(&mut self) {
        if self.state == IdleState::Active {
            self.elapsed = Duration::ZERO;
        }
    }

    /// Advance the counter by one tick.
    ///
    /// Returns `true` exactly once: on the tick that reaches the limit. The
    /// monitor is then logged out and ignores ticks until re-armed.
    pub fn tick(&mut self) -> bool {
        if self.state != IdleState::Active {
            return false;
        }

        self.elapsed = self.elapsed.saturating_add(self.tick);
        if self.elapsed >= self.limit {
            self.state = IdleState::LoggedOut;
            return true;
        }
        false
    }

    /// Start counting for a new session
    pub fn rearm(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = IdleState::Active;
    }

    pub fn stop(&mut self) {
        self.state = IdleState::LoggedOut;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn state(&self) -> IdleState {
        self.state
    }
}
