//! Token pair persisted in the data directory

use busadmin_core::{StoreError, TokenPair, TokenStore};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const SESSION_FILE: &str = "session.json";

/// [`TokenStore`] backed by `<data-dir>/session.json`.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the session file, so a reader never sees half a pair. The temporary
/// file is created owner-only, and the rename keeps those permissions.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::unavailable(err.to_string())),
        };
        let pair = serde_json::from_str(&content)?;
        Ok(Some(pair))
    }

    fn set(&self, pair: &TokenPair) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.dir())?;

        let mut file = NamedTempFile::new_in(self.dir())?;
        serde_json::to_writer_pretty(&mut file, pair)
            .map_err(|err| StoreError::write(err.to_string()))?;
        file.flush()?;
        file.persist(&self.path)
            .map_err(|err| StoreError::write(err.error.to_string()))?;

        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
