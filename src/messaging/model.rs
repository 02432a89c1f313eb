use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    /// The voice assistant; stored as `lumia` for compatibility with existing
    /// histories.
    #[serde(rename = "lumia")]
    Assistant,
}

/// One line of the chat transcript kept in general storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: ChatSender,
    pub timestamp: DateTime<FixedOffset>,
}
