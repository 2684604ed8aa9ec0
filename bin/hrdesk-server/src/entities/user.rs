use crate::entities::{AnyStore, dao::User, parse_rfc3339_or_now};
use chrono::Utc;
use std::future::Future;

type UserRow = (i64, String, i64, i64, String);

pub trait UserStore: Send + Sync + 'static {
    fn create_user(
        &self,
        username: &str,
        token_hash: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> impl Future<Output = Result<User, sqlx::Error>> + Send;
    fn find_user_by_token(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
    fn get_user(&self, id: i64) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

fn to_user((id, username, is_staff, is_superuser, created_at): UserRow) -> User {
    User {
        id,
        username,
        is_staff: is_staff != 0,
        is_superuser: is_superuser != 0,
        created_at: parse_rfc3339_or_now(&created_at, "users.created_at"),
    }
}

impl UserStore for AnyStore {
    async fn create_user(
        &self,
        username: &str,
        token_hash: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username, token_hash, is_staff, is_superuser, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING id, username, is_staff, is_superuser, created_at",
        )
        .bind(username)
        .bind(token_hash)
        .bind(i64::from(is_staff))
        .bind(i64::from(is_superuser))
        .bind(&created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(to_user(row))
    }

    async fn find_user_by_token(&self, token_hash: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, is_staff, is_superuser, created_at \
             FROM users WHERE token_hash = ?1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_user))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, is_staff, is_superuser, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_user))
    }
}
