use chrono::{DateTime, Utc};
use hrdesk_rag::DocumentType;

/// A row in the `documents` table joined with the uploader's username.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: i64,
    pub title: String,
    /// Original file name as uploaded.
    pub file_name: String,
    /// Where the bytes live under the media directory.
    pub file_path: String,
    pub document_type: DocumentType,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: i64,
    pub uploader: String,
}

/// Insert payload for [`crate::entities::DocumentStore::insert_document`].
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub file_name: String,
    pub file_path: String,
    pub document_type: DocumentType,
    pub uploaded_by: i64,
}
