//! Persisted holder for the access/refresh token pair

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The credentials of an authenticated session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Storage for the token pair.
///
/// `set` replaces both tokens in one step: a concurrent `get` observes either
/// the previous pair or the new one, never a mix.
pub trait TokenStore {
    fn get(&self) -> Result<Option<TokenPair>, StoreError>;

    fn set(&self, pair: &TokenPair) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    /// Replace the access token, keeping the stored refresh token
    fn set_access_token(&self, access_token: &str) -> Result<(), StoreError> {
        let pair = self
            .get()?
            .ok_or_else(|| StoreError::unavailable("no session to update"))?;
        self.set(&TokenPair {
            access_token: access_token.to_string(),
            refresh_token: pair.refresh_token,
        })
    }
}

impl<S: TokenStore + ?Sized> TokenStore for Rc<S> {
    fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        (**self).get()
    }

    fn set(&self, pair: &TokenPair) -> Result<(), StoreError> {
        (**self).set(pair)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// In-process store; the session ends with the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: RefCell<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        Ok(self.pair.borrow().clone())
    }

    fn set(&self, pair: &TokenPair) -> Result<(), StoreError> {
        *self.pair.borrow_mut() = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.pair.borrow_mut().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_same_pair() {
        let store = MemoryTokenStore::new();
        assert!(store.get().unwrap().is_none());

        let pair = TokenPair::new("access", "refresh");
        store.set(&pair).unwrap();
        assert_eq!(store.get().unwrap(), Some(pair));
    }

    #[test]
    fn clear_removes_both_tokens() {
        let store = MemoryTokenStore::new();
        store.set(&TokenPair::new("a", "r")).unwrap();
        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn set_access_token_keeps_refresh_token() {
        let store = MemoryTokenStore::new();
        store.set(&TokenPair::new("old", "refresh")).unwrap();
        store.set_access_token("new").unwrap();
        assert_eq!(store.get().unwrap(), Some(TokenPair::new("new", "refresh")));
    }

    #[test]
    fn set_access_token_without_session_fails() {
        let store = MemoryTokenStore::new();
        assert!(store.set_access_token("new").is_err());
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn debug_output_hides_tokens() {
        let rendered = format!("{:?}", TokenPair::new("secret-a", "secret-r"));
        assert!(!rendered.contains("secret"));
    }
}
