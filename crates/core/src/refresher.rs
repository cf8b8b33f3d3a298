//! Access-token renewal
//!
//! The refresher exchanges the stored refresh token for a new access token,
//! either on demand or from a self-rescheduling renewal timer armed one lead
//! interval before the access token expires. Concurrent callers share a single
//! in-flight exchange.

use crate::backend::AuthBackend;
use crate::claims;
use crate::clock::Clock;
use crate::error::RefreshError;
use crate::runtime::{self, TimerHandle};
use crate::store::TokenStore;
use crate::subscription::{ListenerSet, Subscription};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

type InFlight = Shared<LocalBoxFuture<'static, Result<String, RefreshError>>>;

/// Lifecycle notifications, one `Started`/`Finished` pair per exchange
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Started,
    Finished(Result<(), RefreshError>),
}

type Listener = dyn Fn(&RefreshEvent);

pub struct TokenRefresher {
    this: Weak<TokenRefresher>,
    backend: Rc<dyn AuthBackend>,
    store: Rc<dyn TokenStore>,
    clock: Rc<dyn Clock>,
    lead: Duration,
    // Bumped by `reset`; exchanges started under an older epoch are discarded
    epoch: Cell<u64>,
    in_flight: RefCell<Option<InFlight>>,
    renewal: RefCell<Option<TimerHandle>>,
    listeners: Rc<RefCell<ListenerSet<Listener>>>,
}

impl TokenRefresher {
    pub fn new(
        backend: Rc<dyn AuthBackend>,
        store: Rc<dyn TokenStore>,
        clock: Rc<dyn Clock>,
        lead: Duration,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            backend,
            store,
            clock,
            lead,
            epoch: Cell::new(0),
            in_flight: RefCell::new(None),
            renewal: RefCell::new(None),
            listeners: Rc::new(RefCell::new(ListenerSet::default())),
        })
    }

    /// Register for refresh lifecycle events
    pub fn on_event(&self, listener: impl Fn(&RefreshEvent) + 'static) -> Subscription {
        let id = self.listeners.borrow_mut().insert(Rc::new(listener));
        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().remove(id);
            }
        })
    }

    /// Obtain a new access token.
    ///
    /// Joins the exchange already in flight if there is one. Without a stored
    /// refresh token this fails with [`RefreshError::NoRefreshToken`] and sends
    /// nothing.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let pending = self.in_flight.borrow().clone();
        let exchange = match pending {
            Some(exchange) => {
                tracing::debug!("joining in-flight token refresh");
                exchange
            }
            None => {
                let Some(pair) = self.store.get()? else {
                    tracing::debug!("no refresh token stored; skipping refresh");
                    return Err(RefreshError::NoRefreshToken);
                };
                self.start_exchange(pair.refresh_token)
            }
        };
        exchange.await
    }

    fn start_exchange(&self, refresh_token: String) -> InFlight {
        let epoch = self.epoch.get();
        let backend = Rc::clone(&self.backend);
        let this = self.this.clone();

        let exchange = async move {
            let result = backend
                .refresh(&refresh_token)
                .await
                .map(|response| response.access_token)
                .map_err(RefreshError::from);
            match this.upgrade() {
                Some(refresher) => refresher.complete(epoch, result),
                None => Err(RefreshError::Aborted),
            }
        }
        .boxed_local()
        .shared();

        *self.in_flight.borrow_mut() = Some(exchange.clone());
        tracing::debug!("token refresh started");
        self.emit(&RefreshEvent::Started);
        exchange
    }

    // Runs once per exchange, inside the shared future
    fn complete(
        &self,
        epoch: u64,
        result: Result<String, RefreshError>,
    ) -> Result<String, RefreshError> {
        if self.epoch.get() != epoch {
            tracing::debug!("discarding refresh result that landed after logout");
            return Err(RefreshError::Aborted);
        }
        self.in_flight.borrow_mut().take();

        let outcome = result.and_then(|access_token| {
            self.store.set_access_token(&access_token)?;
            Ok(access_token)
        });

        match &outcome {
            Ok(access_token) => {
                tracing::info!("access token refreshed");
                self.schedule_renewal(access_token);
            }
            Err(err) if err.is_network() => {
                tracing::warn!(error = %err, "token refresh could not reach the server");
                self.cancel_renewal();
            }
            Err(err) => {
                tracing::error!(error = %err, "token refresh failed");
                self.cancel_renewal();
            }
        }

        self.emit(&RefreshEvent::Finished(
            outcome.as_ref().map(|_| ()).map_err(Clone::clone),
        ));
        outcome
    }

    fn emit(&self, event: &RefreshEvent) {
        let listeners = self.listeners.borrow().snapshot();
        for listener in listeners {
            listener(event);
        }
    }

    /// Arm the proactive renewal for `access_token`, replacing any pending one.
    ///
    /// Returns the armed delay, or `None` when the token is already inside the
    /// lead window (the next dispatch refreshes it reactively).
    pub fn schedule_renewal(&self, access_token: &str) -> Option<Duration> {
        self.cancel_renewal();

        let Some(delay) = claims::renewal_delay(access_token, self.clock.now(), self.lead) else {
            tracing::debug!("access token inside renewal lead window; no renewal armed");
            return None;
        };

        let this = self.this.clone();
        let handle = runtime::spawn_timer(delay, move || async move {
            let Some(refresher) = this.upgrade() else {
                return;
            };
            tracing::debug!("proactive token renewal due");
            // Outcome is delivered to event listeners
            let _ = refresher.refresh().await;
        });
        *self.renewal.borrow_mut() = Some(handle);

        tracing::debug!(delay_secs = delay.as_secs(), "token renewal scheduled");
        Some(delay)
    }

    pub fn cancel_renewal(&self) {
        let pending = self.renewal.borrow_mut().take();
        drop(pending);
    }

    pub fn has_pending_renewal(&self) -> bool {
        self.renewal.borrow().is_some()
    }

    /// Forget all refresh state; results still in flight are discarded
    pub fn reset(&self) {
        self.epoch.set(self.epoch.get().wrapping_add(1));
        self.in_flight.borrow_mut().take();
        self.cancel_renewal();
    }
}
