//! Test doubles for the session components

use crate::backend::AuthBackend;
use crate::claims::{AccessClaims, encode_unsigned};
use crate::clock::Clock;
use async_trait::async_trait;
use busadmin_http::ClientError;
use busadmin_http::types::{
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, SignupRequest,
};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

/// Unsigned access token expiring at `exp`
pub fn token_expiring_at(exp: DateTime<Utc>) -> String {
    encode_unsigned(&AccessClaims {
        exp: exp.timestamp(),
        iat: None,
        sub: Some("admin@example.com".into()),
    })
}

/// Wall clock that follows tokio's (possibly paused) clock
pub struct PausedClock {
    wall_start: DateTime<Utc>,
    start: tokio::time::Instant,
}

impl PausedClock {
    pub fn new() -> Self {
        // Whole seconds, so delays derived from `exp` come out exact
        let now = Utc::now();
        Self {
            wall_start: DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now),
            start: tokio::time::Instant::now(),
        }
    }

    /// Token valid for `secs` seconds from now
    pub fn token_valid_for(&self, secs: i64) -> String {
        token_expiring_at(self.now() + chrono::Duration::seconds(secs))
    }
}

impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.start.elapsed()).unwrap_or_default();
        self.wall_start + elapsed
    }
}

/// Scripted [`AuthBackend`]
#[derive(Default)]
pub struct FakeBackend {
    pub login_result: RefCell<Option<Result<LoginResponse, ClientError>>>,
    pub refresh_results: RefCell<VecDeque<Result<String, ClientError>>>,
    pub refresh_latency: Cell<Duration>,
    pub login_calls: Cell<u32>,
    pub signup_calls: Cell<u32>,
    pub refresh_calls: Cell<u32>,
    pub last_refresh_token: RefCell<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_returns(&self, access_token: &str, refresh_token: &str) {
        *self.login_result.borrow_mut() = Some(Ok(LoginResponse {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            message: Some("Login successful".into()),
        }));
    }

    pub fn login_fails(&self, err: ClientError) {
        *self.login_result.borrow_mut() = Some(Err(err));
    }

    pub fn push_refresh(&self, result: Result<String, ClientError>) {
        self.refresh_results.borrow_mut().push_back(result);
    }

    pub fn push_network_failure(&self) {
        self.push_refresh(Err(ClientError::Network("connection refused".into())));
    }
}

#[async_trait(?Send)]
impl AuthBackend for FakeBackend {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.login_calls.set(self.login_calls.get() + 1);
        self.login_result
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(ClientError::AuthenticationFailed("no scripted login".into())))
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<MessageResponse, ClientError> {
        self.signup_calls.set(self.signup_calls.get() + 1);
        Ok(MessageResponse {
            message: "User created".into(),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        self.refresh_calls.set(self.refresh_calls.get() + 1);
        *self.last_refresh_token.borrow_mut() = Some(refresh_token.to_string());

        let latency = self.refresh_latency.get();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let next = self.refresh_results.borrow_mut().pop_front();
        match next {
            Some(Ok(access_token)) => Ok(RefreshResponse { access_token }),
            Some(Err(err)) => Err(err),
            None => Err(ClientError::AuthenticationFailed(
                "no scripted refresh".into(),
            )),
        }
    }
}
