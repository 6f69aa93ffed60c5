use support_widget_core::SessionStore;
use thiserror::Error;
use web_sys::Storage;

use super::*;

#[derive(Debug, Error)]
pub(super) enum LocalStorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("failed to {action} local storage key {key}")]
    Access { action: &'static str, key: String },
}

/// Keeps the active conversation id in `window.localStorage`, so it survives
/// page reloads on the same origin.
pub(super) struct LocalStorageSessionStore {
    key: String,
}

impl LocalStorageSessionStore {
    pub(super) fn new(key: String) -> Self {
        Self { key }
    }

    fn storage(&self) -> Result<Storage, LocalStorageError> {
        let window = web_sys::window().ok_or(LocalStorageError::Unavailable)?;
        window
            .local_storage()
            .map_err(|_| LocalStorageError::Unavailable)?
            .ok_or(LocalStorageError::Unavailable)
    }

    fn access_error(&self, action: &'static str) -> LocalStorageError {
        LocalStorageError::Access {
            action,
            key: self.key.clone(),
        }
    }
}

impl SessionStore for LocalStorageSessionStore {
    type Error = LocalStorageError;

    fn load_conversation_id(&self) -> Result<Option<ConversationId>, Self::Error> {
        let raw = self
            .storage()?
            .get_item(&self.key)
            .map_err(|_| self.access_error("read"))?;
        Ok(raw.and_then(|raw| ConversationId::from_stored(&raw)))
    }

    fn persist_conversation_id(&self, conversation_id: &ConversationId) -> Result<(), Self::Error> {
        self.storage()?
            .set_item(&self.key, conversation_id.as_str())
            .map_err(|_| self.access_error("write"))
    }

    fn clear_conversation_id(&self) -> Result<(), Self::Error> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|_| self.access_error("remove"))
    }
}
