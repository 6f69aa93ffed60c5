use std::cell::RefCell;
use std::convert::Infallible;

use crate::types::ConversationId;

/// Storage key the browser build uses; other stores reuse it as a file name.
pub const DEFAULT_SESSION_STORAGE_KEY: &str = "current_ticket_id";

/// Persists the single active conversation id across widget reopen and page
/// reload. The id is only removed through [`SessionStore::clear_conversation_id`].
pub trait SessionStore {
    type Error: std::fmt::Display;

    fn load_conversation_id(&self) -> Result<Option<ConversationId>, Self::Error>;
    fn persist_conversation_id(&self, conversation_id: &ConversationId)
    -> Result<(), Self::Error>;
    fn clear_conversation_id(&self) -> Result<(), Self::Error>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RefCell<Option<ConversationId>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn with_conversation(conversation_id: ConversationId) -> Self {
        Self {
            slot: RefCell::new(Some(conversation_id)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    type Error = Infallible;

    fn load_conversation_id(&self) -> Result<Option<ConversationId>, Self::Error> {
        Ok(self.slot.borrow().clone())
    }

    fn persist_conversation_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = Some(conversation_id.clone());
        Ok(())
    }

    fn clear_conversation_id(&self) -> Result<(), Self::Error> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for std::rc::Rc<S> {
    type Error = S::Error;

    fn load_conversation_id(&self) -> Result<Option<ConversationId>, Self::Error> {
        (**self).load_conversation_id()
    }

    fn persist_conversation_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), Self::Error> {
        (**self).persist_conversation_id(conversation_id)
    }

    fn clear_conversation_id(&self) -> Result<(), Self::Error> {
        (**self).clear_conversation_id()
    }
}
