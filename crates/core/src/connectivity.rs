//! Bounded retry of refreshes that failed for lack of network
//!
//! A refresh that fails with a network error opens a retry episode. Each time
//! the browser reports that it is back online, the refresh is attempted again.
//! Every further network failure in the episode counts against the budget;
//! exhausting it ends the session instead of retrying.

/// What the session should do in response to a connectivity event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityAction {
    None,
    RetryRefresh,
    ForceLogout,
}

#[derive(Debug, Clone)]
pub struct ConnectivityWatcher {
    online: bool,
    awaiting_retry: bool,
    attempts: u32,
    max_attempts: u32,
}

impl ConnectivityWatcher {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            online: true,
            awaiting_retry: false,
            attempts: 0,
            max_attempts,
        }
    }

    /// A refresh could not reach the server
    pub fn record_network_failure(&mut self) -> ConnectivityAction {
        // The failure itself is our best evidence of being offline
        self.online = false;

        if !self.awaiting_retry {
            self.awaiting_retry = true;
            tracing::debug!("refresh failed offline; waiting for connectivity");
            return ConnectivityAction::None;
        }

        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            tracing::warn!(
                attempts = self.attempts,
                "refresh retries exhausted; ending session"
            );
            self.clear_episode();
            return ConnectivityAction::ForceLogout;
        }

        tracing::debug!(attempts = self.attempts, "refresh retry failed offline");
        ConnectivityAction::None
    }

    /// A refresh succeeded
    pub fn record_success(&mut self) {
        self.clear_episode();
        self.online = true;
    }

    /// The platform reported an online/offline transition
    pub fn set_online(&mut self, online: bool) -> ConnectivityAction {
        let came_online = online && !self.online;
        self.online = online;

        if came_online && self.awaiting_retry {
            tracing::debug!(attempts = self.attempts, "back online; retrying refresh");
            ConnectivityAction::RetryRefresh
        } else {
            ConnectivityAction::None
        }
    }

    /// Forget the current episode (logout or a new login)
    pub fn reset(&mut self) {
        self.clear_episode();
    }

    fn clear_episode(&mut self) {
        self.awaiting_retry = false;
        self.attempts = 0;
    }

    pub fn is_awaiting_retry(&self) -> bool {
        self.awaiting_retry
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_without_failure_does_nothing() {
        let mut watcher = ConnectivityWatcher::new(3);
        assert_eq!(watcher.set_online(false), ConnectivityAction::None);
        assert_eq!(watcher.set_online(true), ConnectivityAction::None);
    }

    #[test]
    fn reconnect_retries_failed_refresh() {
        let mut watcher = ConnectivityWatcher::new(3);
        assert_eq!(watcher.record_network_failure(), ConnectivityAction::None);
        assert!(watcher.is_awaiting_retry());
        assert_eq!(watcher.set_online(true), ConnectivityAction::RetryRefresh);
        // No transition, no retry
        assert_eq!(watcher.set_online(true), ConnectivityAction::None);
    }

    #[test]
    fn fourth_failure_forces_logout_instead_of_retry() {
        let mut watcher = ConnectivityWatcher::new(3);
        let mut retries = 0;

        assert_eq!(watcher.record_network_failure(), ConnectivityAction::None);
        loop {
            match watcher.set_online(true) {
                ConnectivityAction::RetryRefresh => retries += 1,
                other => panic!("unexpected {other:?}"),
            }
            assert!(watcher.attempts() < 3);
            match watcher.record_network_failure() {
                ConnectivityAction::None => {}
                ConnectivityAction::ForceLogout => break,
                other => panic!("unexpected {other:?}"),
            }
        }

        assert_eq!(retries, 3);
        assert!(!watcher.is_awaiting_retry());
        assert_eq!(watcher.set_online(true), ConnectivityAction::None);
    }

    #[test]
    fn success_resets_the_budget() {
        let mut watcher = ConnectivityWatcher::new(3);
        watcher.record_network_failure();
        watcher.set_online(true);
        watcher.record_network_failure();
        watcher.set_online(true);
        watcher.record_network_failure();
        assert_eq!(watcher.attempts(), 2);

        watcher.record_success();
        assert_eq!(watcher.attempts(), 0);
        assert!(!watcher.is_awaiting_retry());

        // A fresh episode gets the full budget again
        assert_eq!(watcher.record_network_failure(), ConnectivityAction::None);
        watcher.set_online(true);
        assert_eq!(watcher.record_network_failure(), ConnectivityAction::None);
        assert_eq!(watcher.attempts(), 1);
    }

    #[test]
    fn reset_abandons_episode() {
        let mut watcher = ConnectivityWatcher::new(3);
        watcher.record_network_failure();
        watcher.reset();
        assert_eq!(watcher.set_online(true), ConnectivityAction::None);
    }
}
