//! Database abstraction layer.
//!
//! One trait per entity ([`UserStore`], [`DocumentStore`], [`SessionStore`],
//! [`ChatStore`]), all implemented by [`AnyStore`] over a sqlx `Any` pool.
//! Handlers only see the traits, so moving to another sqlx backend means
//! changing the connection URL and, where the SQL dialect differs, the
//! queries in this module.
//!
//! All trait methods use `impl Future` in their signatures so no extra
//! `async-trait` crate is required.

pub mod chat;
pub mod dao;
pub mod document;
pub mod session;
pub mod user;

pub use dao::{ChatMessage, ChatSession, DocumentRecord, MessageType, NewDocument, User};

pub use chat::ChatStore;
pub use document::DocumentStore;
pub use session::SessionStore;
pub use user::UserStore;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::any::AnyPoolOptions;

#[derive(Clone, Debug)]
pub struct AnyStore {
    pool: sqlx::Pool<sqlx::Any>,
}

impl AnyStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible URL, e.g. `"sqlite://hrdesk.db?mode=rwc"`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        Self::connect_with(url, AnyPoolOptions::new()).await
    }

    /// A private in-memory database on a single pinned connection.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::connect_with("sqlite::memory:", options).await
    }

    async fn connect_with(url: &str, options: AnyPoolOptions) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let connect = sqlx::any::AnyConnectOptions::from_str(url)?;
        let pool = options.connect_with(connect).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn parse_rfc3339_or_now(raw: &str, field: &'static str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw = %raw, error = %e, field, "failed to parse timestamp; using now");
        Utc::now()
    })
}

fn decode_enum<T>(raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrdesk_rag::DocumentType;

    async fn store_with_user(name: &str, admin: bool) -> (AnyStore, User) {
        let store = AnyStore::in_memory().await.expect("in-memory store");
        let user = store
            .create_user(name, &format!("hash-{name}"), admin, false)
            .await
            .expect("create user");
        (store, user)
    }

    #[tokio::test]
    async fn user_lookup_by_token_hash() {
        let (store, user) = store_with_user("alice", true).await;
        let found = store.find_user_by_token("hash-alice").await.unwrap().expect("user");
        assert_eq!(found.id, user.id);
        assert!(found.is_admin());
        assert!(store.find_user_by_token("hash-bob").await.unwrap().is_none());
        assert_eq!(store.get_user(user.id).await.unwrap().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn get_or_create_session_is_idempotent() {
        let (store, user) = store_with_user("alice", false).await;
        assert!(store.find_session_by_user(user.id).await.unwrap().is_none());

        let first = store.get_or_create_session(user.id).await.unwrap();
        let second = store.get_or_create_session(user.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.user_id, user.id);
        assert_eq!(store.find_session_by_user(user.id).await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_get_or_create_yields_one_session() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("hrdesk.db").display());
        let store = AnyStore::connect(&url).await.expect("file store");
        let user_id = store.create_user("alice", "hash-alice", false, false).await.unwrap().id;

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move { store.get_or_create_session(user_id).await }));
        }
        let mut ids = std::collections::BTreeSet::new();
        for task in tasks {
            ids.insert(task.await.expect("task").expect("session").id);
        }
        assert_eq!(ids.len(), 1);

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_sessions")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn messages_keep_insertion_order_and_clear_per_session() {
        let (store, alice) = store_with_user("alice", false).await;
        let bob = store.create_user("bob", "hash-bob", false, false).await.unwrap();
        let a = store.get_or_create_session(alice.id).await.unwrap();
        let b = store.get_or_create_session(bob.id).await.unwrap();

        store.append_message(a.id, MessageType::User, "hi").await.unwrap();
        store.append_message(a.id, MessageType::Bot, "hello").await.unwrap();
        store.append_message(b.id, MessageType::User, "bob here").await.unwrap();

        let history = store.list_messages(a.id).await.unwrap();
        let kinds: Vec<_> = history.iter().map(|m| m.message_type).collect();
        assert_eq!(kinds, vec![MessageType::User, MessageType::Bot]);
        assert_eq!(history[1].content, "hello");

        assert_eq!(store.clear_messages(a.id).await.unwrap(), 2);
        assert!(store.list_messages(a.id).await.unwrap().is_empty());
        assert_eq!(store.list_messages(b.id).await.unwrap().len(), 1);
        // Session survives a clear.
        assert_eq!(store.get_or_create_session(alice.id).await.unwrap().id, a.id);
    }

    #[tokio::test]
    async fn documents_list_newest_first_and_delete() {
        let (store, admin) = store_with_user("admin", true).await;
        let mut ids = Vec::new();
        for (title, kind) in [("Leave", DocumentType::Pdf), ("Travel", DocumentType::Txt)] {
            let id = store
                .insert_document(NewDocument {
                    title: title.into(),
                    file_name: format!("{title}.{kind}"),
                    file_path: format!("documents/{title}.{kind}"),
                    document_type: kind,
                    uploaded_by: admin.id,
                })
                .await
                .unwrap();
            ids.push(id);
        }

        let listed = store.list_documents().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Travel");
        assert_eq!(listed[0].document_type, DocumentType::Txt);
        assert_eq!(listed[0].uploader, "admin");
        assert_eq!(store.count_documents().await.unwrap(), 2);

        let leave = store.get_document(ids[0]).await.unwrap().unwrap();
        assert_eq!(leave.document_type, DocumentType::Pdf);

        assert!(store.delete_document(ids[0]).await.unwrap());
        assert!(!store.delete_document(ids[0]).await.unwrap());
        assert!(store.get_document(ids[0]).await.unwrap().is_none());
        assert_eq!(store.count_documents().await.unwrap(), 1);
    }
}
