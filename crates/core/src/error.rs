//! Error types shared by the session components

use busadmin_http::ClientError;

use crate::validation::ValidationError;

/// Standard result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Failures of the persisted token store
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Token storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Stored session is corrupt: {message}")]
    Corrupt { message: String },

    #[error("Failed to persist session: {message}")]
    Write { message: String },
}

impl StoreError {
    /// Create an unavailable-storage error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a corrupt-data error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::write(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::corrupt(err.to_string())
    }
}

/// Outcome of a failed refresh-token exchange
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    /// Nothing to exchange; no request was sent
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Transient: the backend could not be reached
    #[error("Network error during refresh: {0}")]
    Network(String),

    /// Unrecoverable: the backend refused the refresh token
    #[error("Refresh rejected: {0}")]
    Rejected(ClientError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The session was reset while the exchange was in flight
    #[error("Refresh discarded after logout")]
    Aborted,
}

impl RefreshError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether this failure must end the session
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Network(_) | Self::Aborted)
    }
}

impl From<ClientError> for RefreshError {
    fn from(err: ClientError) -> Self {
        if err.is_network() {
            Self::Network(err.to_string())
        } else {
            Self::Rejected(err)
        }
    }
}

/// Coarse classification used to pick a user-facing reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Network,
    AuthRejected,
    RefreshFailedFatal,
    SessionExpired,
    Client,
    Storage,
}

/// Errors surfaced by session-level operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(RefreshError),

    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Backend error passed through unmodified
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::RefreshFailed(_) => ErrorKind::RefreshFailedFatal,
            Self::SessionExpired => ErrorKind::SessionExpired,
            Self::Client(err) if err.is_network() => ErrorKind::Network,
            Self::Client(err) if err.is_token_rejected() => ErrorKind::AuthRejected,
            Self::Client(ClientError::AuthenticationFailed(_)) => ErrorKind::AuthRejected,
            Self::Client(_) => ErrorKind::Client,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether the session has ended as a result of this error
    pub fn ends_session(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::SessionExpired | ErrorKind::RefreshFailedFatal
        )
    }

    /// Text suitable for a transient user notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) => err.user_message(),
            Self::Network(_) => "Unable to reach the server. Check your connection.".to_string(),
            Self::RefreshFailed(_) | Self::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<RefreshError> for SessionError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Network(message) => Self::Network(message),
            RefreshError::NoRefreshToken | RefreshError::Aborted => Self::SessionExpired,
            RefreshError::Storage(err) => Self::Storage(err),
            err @ RefreshError::Rejected(_) => Self::RefreshFailed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        let err = SessionError::from(ClientError::TokenRejected("Invalid Token".into()));
        assert_eq!(err.kind(), ErrorKind::AuthRejected);

        let err = SessionError::from(ClientError::Network("connection refused".into()));
        assert_eq!(err.kind(), ErrorKind::Network);

        let err = SessionError::from(ClientError::BadRequest("Bus exists".into()));
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.user_message(), "Bus exists");
    }

    #[test]
    fn refresh_errors_map_to_session_errors() {
        let err = SessionError::from(RefreshError::Network("offline".into()));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(!err.ends_session());

        let err = SessionError::from(RefreshError::Rejected(ClientError::AuthenticationFailed(
            "expired refresh token".into(),
        )));
        assert_eq!(err.kind(), ErrorKind::RefreshFailedFatal);
        assert!(err.ends_session());

        let err = SessionError::from(RefreshError::NoRefreshToken);
        assert_eq!(err.kind(), ErrorKind::SessionExpired);
    }

    #[test]
    fn refresh_error_from_client_error() {
        assert!(RefreshError::from(ClientError::Network("dns".into())).is_network());
        let fatal = RefreshError::from(ClientError::Forbidden("revoked".into()));
        assert!(fatal.is_fatal());
        assert!(!RefreshError::Aborted.is_fatal());
    }
}
