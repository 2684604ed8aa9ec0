use chrono::{DateTime, Utc};

/// A row in the `users` table. The API token itself is never loaded.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Staff and superusers may manage documents.
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}
