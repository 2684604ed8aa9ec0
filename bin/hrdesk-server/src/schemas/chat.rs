use crate::entities::ChatMessage;
use crate::schemas::FieldErrors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Longest accepted question, in bytes.
pub const MAX_CONTENT_BYTES: usize = 128 * 1024;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ChatForm {
    #[serde(default)]
    #[validate(custom(function = "validate_content"))]
    pub content: String,
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("This field is required.".into()));
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(ValidationError::new("max_length")
            .with_message(format!("Ensure this value has at most {MAX_CONTENT_BYTES} bytes.").into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessagePayload {
    pub content: String,
    /// `HH:MM`, UTC.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Body of `POST /chat/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub status: ReplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<MessagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_message: Option<MessagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<FieldErrors>,
}

impl ChatReply {
    pub fn turn(status: ReplyStatus, user: &ChatMessage, bot: &ChatMessage) -> Self {
        Self {
            status,
            user_message: Some(user.to_payload()),
            bot_message: Some(bot.to_payload()),
            errors: None,
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self {
            status: ReplyStatus::Error,
            user_message: None,
            bot_message: None,
            errors: Some(errors),
        }
    }
}

/// One entry of `GET /chat/history/` and of the home page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    pub id: i64,
    /// `user` or `bot`.
    pub message_type: String,
    pub content: String,
    pub timestamp: String,
    pub created_at: String,
}

impl ChatMessage {
    pub fn timestamp(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }

    pub fn to_payload(&self) -> MessagePayload {
        MessagePayload {
            content: self.content.clone(),
            timestamp: self.timestamp(),
        }
    }

    pub fn to_history(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            message_type: self.message_type.to_string(),
            content: self.content.clone(),
            timestamp: self.timestamp(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
