//! Token pair persisted in `localStorage`

use crate::config::AuthConfig;
use busadmin_core::{StoreError, TokenPair, TokenStore};
use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};

/// [`TokenStore`] backed by the browser's `localStorage`.
///
/// Both tokens live under one key, so every write is a single `setItem`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageTokenStore;

impl LocalStorageTokenStore {
    pub fn new() -> Self {
        Self
    }

    // Pairs saved by older builds under separate keys are moved to the single key
    fn migrate_legacy(&self) -> Result<Option<TokenPair>, StoreError> {
        let access = LocalStorage::raw()
            .get_item(AuthConfig::LEGACY_ACCESS_KEY)
            .map_err(|_| StoreError::unavailable("localStorage read failed"))?;
        let refresh = LocalStorage::raw()
            .get_item(AuthConfig::LEGACY_REFRESH_KEY)
            .map_err(|_| StoreError::unavailable("localStorage read failed"))?;

        let (Some(access), Some(refresh)) = (access, refresh) else {
            return Ok(None);
        };

        let pair = TokenPair::new(access, refresh);
        self.set(&pair)?;
        tracing::debug!("migrated session from legacy storage keys");
        Ok(Some(pair))
    }
}

fn map_error(err: StorageError) -> StoreError {
    match err {
        StorageError::SerdeError(e) => StoreError::corrupt(e.to_string()),
        StorageError::KeyNotFound(key) => StoreError::unavailable(format!("missing key {key}")),
        StorageError::JsError(e) => StoreError::unavailable(e.to_string()),
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        match LocalStorage::get::<TokenPair>(AuthConfig::SESSION_KEY) {
            Ok(pair) => Ok(Some(pair)),
            Err(StorageError::KeyNotFound(_)) => self.migrate_legacy(),
            Err(err) => Err(map_error(err)),
        }
    }

    fn set(&self, pair: &TokenPair) -> Result<(), StoreError> {
        LocalStorage::set(AuthConfig::SESSION_KEY, pair).map_err(|err| match err {
            StorageError::JsError(e) => StoreError::write(e.to_string()),
            other => map_error(other),
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        LocalStorage::delete(AuthConfig::SESSION_KEY);
        LocalStorage::delete(AuthConfig::LEGACY_ACCESS_KEY);
        LocalStorage::delete(AuthConfig::LEGACY_REFRESH_KEY);
        Ok(())
    }
}
