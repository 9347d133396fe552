use serde::{Deserialize, Serialize};

/// A single chat message sent to the model (provider-agnostic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Every prompt is a single user turn; no system or assistant turns are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
        }
    }
}
