use crate::entities::dao::{DocumentRecord, NewDocument};
use crate::entities::{AnyStore, decode_enum, parse_rfc3339_or_now};
use chrono::{SecondsFormat, Utc};
use std::future::Future;

type DocumentRow = (i64, String, String, String, String, String, i64, String);

const SELECT_DOCUMENT: &str = "SELECT d.id, d.title, d.file_name, d.file_path, d.document_type, \
     d.uploaded_at, d.uploaded_by, u.username \
     FROM documents d JOIN users u ON u.id = d.uploaded_by";

pub trait DocumentStore: Send + Sync + 'static {
    fn insert_document(
        &self,
        doc: NewDocument,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;
    fn get_document(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<DocumentRecord>, sqlx::Error>> + Send;
    /// Newest upload first.
    fn list_documents(&self) -> impl Future<Output = Result<Vec<DocumentRecord>, sqlx::Error>> + Send;
    fn count_documents(&self) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;
    /// Returns `false` if no row had that id.
    fn delete_document(&self, id: i64) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

fn to_record(
    (id, title, file_name, file_path, document_type, uploaded_at, uploaded_by, uploader): DocumentRow,
) -> Result<DocumentRecord, sqlx::Error> {
    Ok(DocumentRecord {
        id,
        title,
        file_name,
        file_path,
        document_type: decode_enum(&document_type)?,
        uploaded_at: parse_rfc3339_or_now(&uploaded_at, "documents.uploaded_at"),
        uploaded_by,
        uploader,
    })
}

impl DocumentStore for AnyStore {
    async fn insert_document(&self, doc: NewDocument) -> Result<i64, sqlx::Error> {
        let uploaded_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO documents (title, file_name, file_path, document_type, uploaded_at, uploaded_by) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
        )
        .bind(&doc.title)
        .bind(&doc.file_name)
        .bind(&doc.file_path)
        .bind(doc.document_type.to_string())
        .bind(&uploaded_at)
        .bind(doc.uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_document(&self, id: i64) -> Result<Option<DocumentRecord>, sqlx::Error> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!("{SELECT_DOCUMENT} WHERE d.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(to_record).transpose()
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, sqlx::Error> {
        let rows: Vec<DocumentRow> =
            sqlx::query_as(&format!("{SELECT_DOCUMENT} ORDER BY d.uploaded_at DESC, d.id DESC"))
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(to_record).collect()
    }

    async fn count_documents(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_document(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
