use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque token naming one support ticket. The shape is owned by the remote
/// service and never inspected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns `None` for blank input, which every store treats as "no
    /// conversation". Anything else is kept byte for byte.
    #[must_use]
    pub fn from_stored(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    User,
    Admin,
}

impl SenderType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender_type: SenderType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(sender_type: SenderType, content: impl Into<String>) -> Self {
        Self {
            sender_type,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(SenderType::User, content)
    }

    #[must_use]
    pub fn admin(content: impl Into<String>) -> Self {
        Self::new(SenderType::Admin, content)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated ticket submission. Only ever built by
/// [`crate::intake::validate_intake`] and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketIntakeRecord {
    pub name: String,
    pub email: String,
    pub account: Option<String>,
    pub description: String,
}
