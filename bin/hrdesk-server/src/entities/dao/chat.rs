use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MessageType {
    User,
    Bot,
}

/// A single message row in the `chat_messages` table.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: i64,
    pub message_type: MessageType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
