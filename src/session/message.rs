use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ChatError;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

impl Message {
    fn new(role: Role, content: String, model_id: Option<String>, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            model_id,
            is_error,
        }
    }

    pub fn user(content: impl Into<String>, model_id: Option<String>) -> Self {
        Self::new(Role::User, content.into(), model_id, false)
    }

    pub fn assistant(content: impl Into<String>, model_id: Option<String>) -> Self {
        Self::new(Role::Assistant, content.into(), model_id, false)
    }

    /// Assistant-role entry describing a failed turn.
    pub fn error(error: &ChatError, model_id: Option<String>) -> Self {
        Self::new(Role::Assistant, format!("Error: {error}"), model_id, true)
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub const fn is_error(&self) -> bool {
        self.is_error
    }
}
