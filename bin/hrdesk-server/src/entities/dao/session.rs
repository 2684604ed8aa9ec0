use chrono::{DateTime, Utc};

/// A row in the `chat_sessions` table.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
