//! Authentication endpoints (public client)

use super::{ClientError, PublicClient};
use crate::types::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, RefreshResponse, SignupRequest,
};
use reqwest::Method;

impl PublicClient {
    /// Authenticate with email and password
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let req = self.request(Method::POST, "user/login").json(request);
        self.execute(req).await
    }

    /// Register a new account
    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::POST, "user/signup").json(request);
        self.execute(req).await
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let req = self
            .request(Method::POST, "user/refresh")
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            });
        self.execute(req).await
    }
}
