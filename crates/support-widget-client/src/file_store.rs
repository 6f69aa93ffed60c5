use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use support_widget_core::{ConversationId, DEFAULT_SESSION_STORAGE_KEY, SessionStore};
use thiserror::Error;

const APP_DIR_NAME: &str = "support-widget";

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("failed to read session file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write session file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to remove session file {}: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },
}

/// Keeps the active conversation id as plain text in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn at_default_location() -> Self {
        Self::new(default_session_path())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    type Error = FileStoreError;

    fn load_conversation_id(&self) -> Result<Option<ConversationId>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(ConversationId::from_stored(&raw)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FileStoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn persist_conversation_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), Self::Error> {
        let write_error = |source: io::Error| FileStoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&self.path, conversation_id.as_str()).map_err(write_error)
    }

    fn clear_conversation_id(&self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FileStoreError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[must_use]
pub fn default_session_path() -> PathBuf {
    if let Some(mut data_dir) = dirs::data_local_dir() {
        data_dir.push(APP_DIR_NAME);
        data_dir.push(DEFAULT_SESSION_STORAGE_KEY);
        return data_dir;
    }

    if let Some(mut home_dir) = dirs::home_dir() {
        home_dir.push(format!(".{APP_DIR_NAME}"));
        home_dir.push(DEFAULT_SESSION_STORAGE_KEY);
        return home_dir;
    }

    PathBuf::from(DEFAULT_SESSION_STORAGE_KEY)
}
