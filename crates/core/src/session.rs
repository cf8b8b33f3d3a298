//! Session lifecycle
//!
//! [`Session`] owns the token refresher, idle monitor and connectivity
//! watcher, drives the session state machine and is the only place a session
//! ends: every logout cause funnels through [`Session::logout`].

use crate::backend::AuthBackend;
use crate::claims;
use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::connectivity::{ConnectivityAction, ConnectivityWatcher};
use crate::dispatcher::Dispatcher;
use crate::error::{RefreshError, SessionError, SessionResult};
use crate::idle::IdleMonitor;
use crate::refresher::{RefreshEvent, TokenRefresher};
use crate::runtime::{self, TimerHandle};
use crate::store::{TokenPair, TokenStore};
use crate::subscription::{ListenerSet, Subscription};
use crate::validation;
use busadmin_http::types::{LoginRequest, MessageResponse, SignupRequest};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticated,
    /// A refresh is in flight, or failed offline and awaits reconnection
    RefreshPending,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    UserRequested,
    IdleTimeout,
    RefreshFailed,
    RetriesExhausted,
    SessionExpired,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UserRequested => "logged out",
            Self::IdleTimeout => "logged out after inactivity",
            Self::RefreshFailed => "session could not be renewed",
            Self::RetriesExhausted => "server unreachable, session ended",
            Self::SessionExpired => "session expired",
        };
        f.write_str(text)
    }
}

type LogoutListener = dyn Fn(LogoutReason);
type StateListener = dyn Fn(SessionState);

/// Handle to an authenticated (or not yet authenticated) console session.
///
/// Cheap to clone; clones share the same session.
///
/// Renewal and idle timers are spawned with [`runtime::spawn_local`], so on
/// native targets [`Session::login`], [`Session::resume`] and anything that
/// refreshes must run inside a tokio `LocalSet`, e.g. under
/// `LocalSet::run_until`. In the browser no setup is needed.
#[derive(Clone)]
pub struct Session {
    inner: Rc<SessionInner>,
}

struct SessionInner {
    this: Weak<SessionInner>,
    backend: Rc<dyn AuthBackend>,
    store: Rc<dyn TokenStore>,
    clock: Rc<dyn Clock>,
    config: SessionConfig,
    refresher: Rc<TokenRefresher>,
    state: Cell<SessionState>,
    idle: RefCell<IdleMonitor>,
    idle_timer: RefCell<Option<TimerHandle>>,
    connectivity: RefCell<ConnectivityWatcher>,
    logout_listeners: Rc<RefCell<ListenerSet<LogoutListener>>>,
    state_listeners: Rc<RefCell<ListenerSet<StateListener>>>,
    _refresh_events: Subscription,
}

impl Session {
    pub fn new(
        backend: Rc<dyn AuthBackend>,
        store: Rc<dyn TokenStore>,
        clock: Rc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        let inner = Rc::new_cyclic(|this: &Weak<SessionInner>| {
            let refresher = TokenRefresher::new(
                Rc::clone(&backend),
                Rc::clone(&store),
                Rc::clone(&clock),
                config.refresh_lead(),
            );
            let session = this.clone();
            let refresh_events = refresher.on_event(move |event| {
                if let Some(inner) = session.upgrade() {
                    inner.on_refresh_event(event);
                }
            });

            SessionInner {
                this: this.clone(),
                idle: RefCell::new(IdleMonitor::new(config.idle_limit(), config.idle_tick())),
                connectivity: RefCell::new(ConnectivityWatcher::new(config.max_refresh_retries)),
                backend,
                store,
                clock,
                config,
                refresher,
                state: Cell::new(SessionState::LoggedOut),
                idle_timer: RefCell::new(None),
                logout_listeners: Rc::new(RefCell::new(ListenerSet::default())),
                state_listeners: Rc::new(RefCell::new(ListenerSet::default())),
                _refresh_events: refresh_events,
            }
        });
        Self { inner }
    }

    /// Pick up a session persisted by an earlier run.
    ///
    /// Returns whether a stored session was found.
    pub fn resume(&self) -> SessionResult<bool> {
        let Some(pair) = self.inner.store.get()? else {
            tracing::debug!("no stored session to resume");
            return Ok(false);
        };
        self.inner.establish(&pair.access_token);
        tracing::info!("session resumed");
        Ok(true)
    }

    /// Authenticate and start a new session
    pub async fn login(&self, credentials: &LoginRequest) -> SessionResult<()> {
        validation::validate_login(credentials)?;

        let response = self.inner.backend.login(credentials).await?;
        let pair = TokenPair::new(response.access_token, response.refresh_token);
        self.inner.store.set(&pair)?;
        self.inner.establish(&pair.access_token);

        tracing::info!("logged in");
        Ok(())
    }

    /// Register a new account. Does not log in.
    pub async fn signup(&self, form: &SignupRequest) -> SessionResult<MessageResponse> {
        validation::validate_signup(form)?;
        let response = self.inner.backend.signup(form).await?;
        tracing::info!("account registered");
        Ok(response)
    }

    /// End the session
    pub fn logout(&self, reason: LogoutReason) {
        self.inner.logout(reason);
    }

    /// Refresh the access token now
    pub async fn refresh(&self) -> SessionResult<String> {
        if self.state() == SessionState::LoggedOut {
            return Err(SessionError::SessionExpired);
        }
        match self.inner.refresher.refresh().await {
            Ok(token) => Ok(token),
            Err(RefreshError::NoRefreshToken) => {
                self.inner.logout(LogoutReason::SessionExpired);
                Err(SessionError::SessionExpired)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Report user activity (pointer, key, touch, page load)
    pub fn record_activity(&self) {
        self.inner.idle.borrow_mut().record_activity();
    }

    /// Report an online/offline transition
    pub fn set_online(&self, online: bool) {
        let action = self.inner.connectivity.borrow_mut().set_online(online);
        self.inner.apply(action);
    }

    /// Dispatcher for authenticated calls in this session
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            Rc::clone(&self.inner.store),
            Rc::clone(&self.inner.clock),
            Rc::clone(&self.inner.refresher),
            self.logout_handle(),
        )
    }

    pub fn logout_handle(&self) -> LogoutHandle {
        LogoutHandle {
            session: Rc::downgrade(&self.inner),
        }
    }

    /// Call `listener` whenever the session ends
    pub fn on_logout(&self, listener: impl Fn(LogoutReason) + 'static) -> Subscription {
        let listener: Rc<LogoutListener> = Rc::new(listener);
        subscribe(&self.inner.logout_listeners, listener)
    }

    /// Call `listener` with the new state on every state transition,
    /// including the one into `LoggedOut`
    pub fn on_state_change(&self, listener: impl Fn(SessionState) + 'static) -> Subscription {
        let listener: Rc<StateListener> = Rc::new(listener);
        subscribe(&self.inner.state_listeners, listener)
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() != SessionState::LoggedOut
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Expiry of the stored access token, if it can be read
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        let pair = self.inner.store.get().ok()??;
        claims::decode(&pair.access_token).ok()?.expires_at()
    }

    pub fn has_pending_renewal(&self) -> bool {
        self.inner.refresher.has_pending_renewal()
    }

    /// A refresh failed offline and will be retried on reconnection
    pub fn is_awaiting_reconnect(&self) -> bool {
        self.inner.connectivity.borrow().is_awaiting_retry()
    }

    pub fn retry_attempts(&self) -> u32 {
        self.inner.connectivity.borrow().attempts()
    }

    pub fn idle_elapsed(&self) -> Duration {
        self.inner.idle.borrow().elapsed()
    }
}

// Identity: two handles are equal when they share a session
impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SessionInner {
    fn establish(&self, access_token: &str) {
        // Anything still in flight belongs to the previous session
        self.refresher.reset();
        self.connectivity.borrow_mut().reset();
        self.idle.borrow_mut().rearm();
        self.arm_idle_timer();
        self.set_state(SessionState::Authenticated);
        self.refresher.schedule_renewal(access_token);
    }

    fn set_state(&self, next: SessionState) {
        if self.state.replace(next) != next {
            self.notify_state(next);
        }
    }

    fn notify_state(&self, state: SessionState) {
        let listeners = self.state_listeners.borrow().snapshot();
        for listener in listeners {
            listener(state);
        }
    }

    fn arm_idle_timer(&self) {
        let session = self.this.clone();
        let handle = runtime::spawn_interval(self.config.idle_tick(), move || {
            if let Some(inner) = session.upgrade() {
                inner.on_idle_tick();
            }
        });
        let previous = self.idle_timer.borrow_mut().replace(handle);
        drop(previous);
    }

    fn on_idle_tick(&self) {
        let timed_out = self.idle.borrow_mut().tick();
        if timed_out {
            tracing::info!(
                limit_secs = self.config.idle_limit().as_secs(),
                "idle limit reached"
            );
            self.logout(LogoutReason::IdleTimeout);
        }
    }

    fn on_refresh_event(&self, event: &RefreshEvent) {
        match event {
            RefreshEvent::Started => {
                if self.state.get() == SessionState::Authenticated {
                    self.set_state(SessionState::RefreshPending);
                }
            }
            RefreshEvent::Finished(Ok(())) => {
                self.connectivity.borrow_mut().record_success();
                if self.state.get() != SessionState::LoggedOut {
                    self.set_state(SessionState::Authenticated);
                }
            }
            RefreshEvent::Finished(Err(err)) if err.is_network() => {
                let action = self.connectivity.borrow_mut().record_network_failure();
                self.apply(action);
            }
            RefreshEvent::Finished(Err(_)) => self.logout(LogoutReason::RefreshFailed),
        }
    }

    fn apply(&self, action: ConnectivityAction) {
        match action {
            ConnectivityAction::None => {}
            ConnectivityAction::RetryRefresh => {
                let refresher = Rc::clone(&self.refresher);
                runtime::spawn_local(async move {
                    // Outcome arrives through refresh events
                    let _ = refresher.refresh().await;
                });
            }
            ConnectivityAction::ForceLogout => self.logout(LogoutReason::RetriesExhausted),
        }
    }

    fn logout(&self, reason: LogoutReason) {
        let previous = self.state.replace(SessionState::LoggedOut);

        self.refresher.reset();
        let idle_timer = self.idle_timer.borrow_mut().take();
        drop(idle_timer);
        self.idle.borrow_mut().stop();
        self.connectivity.borrow_mut().reset();
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear stored session");
        }

        if previous == SessionState::LoggedOut {
            return;
        }

        tracing::info!(%reason, "session ended");
        self.notify_state(SessionState::LoggedOut);
        let listeners = self.logout_listeners.borrow().snapshot();
        for listener in listeners {
            listener(reason);
        }
    }
}

fn subscribe<T: ?Sized + 'static>(
    set: &Rc<RefCell<ListenerSet<T>>>,
    listener: Rc<T>,
) -> Subscription {
    let id = set.borrow_mut().insert(listener);
    let listeners = Rc::downgrade(set);
    Subscription::new(move || {
        if let Some(listeners) = listeners.upgrade() {
            listeners.borrow_mut().remove(id);
        }
    })
}

/// Weak handle that can end the session without keeping it alive
#[derive(Clone)]
pub struct LogoutHandle {
    session: Weak<SessionInner>,
}

impl LogoutHandle {
    pub fn logout(&self, reason: LogoutReason) {
        if let Some(inner) = self.session.upgrade() {
            inner.logout(reason);
        }
    }
}

impl fmt::Debug for LogoutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoutHandle").finish_non_exhaustive()
    }
}
