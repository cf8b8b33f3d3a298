//! Authentication endpoints the session depends on

use async_trait::async_trait;
use busadmin_http::types::{
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, SignupRequest,
};
use busadmin_http::{ClientError, PublicClient};

/// Login, signup and refresh-token exchange
#[async_trait(?Send)]
pub trait AuthBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError>;

    async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ClientError>;

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError>;
}

#[async_trait(?Send)]
impl AuthBackend for PublicClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        PublicClient::login(self, request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ClientError> {
        PublicClient::signup(self, request).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        PublicClient::refresh(self, refresh_token).await
    }
}
