//! Authenticated request dispatch
//!
//! Every authenticated call goes through [`Dispatcher::dispatch`], which makes
//! sure a usable access token is attached and recovers once from a token the
//! backend rejects.

use crate::claims;
use crate::clock::Clock;
use crate::error::{RefreshError, SessionError, SessionResult};
use crate::refresher::TokenRefresher;
use crate::session::{LogoutHandle, LogoutReason};
use crate::store::TokenStore;
use busadmin_http::ClientError;
use std::future::Future;
use std::rc::Rc;

#[derive(Clone)]
pub struct Dispatcher {
    store: Rc<dyn TokenStore>,
    clock: Rc<dyn Clock>,
    refresher: Rc<TokenRefresher>,
    logout: LogoutHandle,
}

impl Dispatcher {
    pub(crate) fn new(
        store: Rc<dyn TokenStore>,
        clock: Rc<dyn Clock>,
        refresher: Rc<TokenRefresher>,
        logout: LogoutHandle,
    ) -> Self {
        Self {
            store,
            clock,
            refresher,
            logout,
        }
    }

    /// Run `call` with a valid access token.
    ///
    /// An expired token is refreshed before the call is made. If the backend
    /// rejects the token anyway, the token is refreshed and the call retried
    /// exactly once; a second rejection is returned as is.
    pub async fn dispatch<T, F, Fut>(&self, call: F) -> SessionResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let token = self.access_token().await?;

        match call(token).await {
            Err(err) if err.is_token_rejected() => {
                tracing::debug!("access token rejected; refreshing and retrying once");
                let token = self.renew().await?;
                Ok(call(token).await?)
            }
            result => Ok(result?),
        }
    }

    /// The stored access token, refreshed first if it has expired
    pub async fn access_token(&self) -> SessionResult<String> {
        let Some(pair) = self.store.get()? else {
            tracing::debug!("no stored session; refusing authenticated call");
            self.logout.logout(LogoutReason::SessionExpired);
            return Err(SessionError::SessionExpired);
        };

        if claims::is_expired(&pair.access_token, self.clock.now()) {
            tracing::debug!("access token expired; refreshing before dispatch");
            self.renew().await
        } else {
            Ok(pair.access_token)
        }
    }

    async fn renew(&self) -> SessionResult<String> {
        match self.refresher.refresh().await {
            Ok(token) => Ok(token),
            Err(RefreshError::Network(message)) => Err(SessionError::Network(message)),
            Err(err) => {
                tracing::warn!(error = %err, "could not renew access token");
                self.logout.logout(LogoutReason::SessionExpired);
                Err(SessionError::SessionExpired)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
