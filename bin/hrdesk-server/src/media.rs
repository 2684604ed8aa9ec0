//! Uploaded files on disk.
//!
//! Documents are stored under `<media_dir>/documents/` with a random prefix so
//! two uploads of `policy.pdf` never collide. The database keeps the path
//! relative to the media directory.

use std::path::{Path, PathBuf};

use hrdesk_rag::SourceDocument;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::DocumentRecord;

const DOCUMENTS_SUBDIR: &str = "documents";

/// Reduce a client-supplied name to a safe single path component.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { "upload".to_owned() } else { cleaned.to_owned() }
}

/// Write `bytes` and return the path relative to the media directory.
pub async fn save_document(config: &Config, file_name: &str, bytes: &[u8]) -> std::io::Result<String> {
    let dir = config.documents_dir();
    tokio::fs::create_dir_all(&dir).await?;
    let stored = format!("{}_{}", Uuid::new_v4().simple(), sanitize_file_name(file_name));
    tokio::fs::write(dir.join(&stored), bytes).await?;
    debug!(file = %stored, size = bytes.len(), "document saved");
    Ok(format!("{DOCUMENTS_SUBDIR}/{stored}"))
}

fn absolute(config: &Config, relative: &str) -> PathBuf {
    config.media_dir.join(Path::new(relative))
}

/// Best effort: a missing file is only logged.
pub async fn remove_document(config: &Config, relative: &str) {
    if let Err(e) = tokio::fs::remove_file(absolute(config, relative)).await {
        warn!(path = %relative, error = %e, "failed to remove document file");
    }
}

/// Read every stored document into memory for the retrieval pipeline.
pub async fn load_sources(config: &Config, docs: &[DocumentRecord]) -> std::io::Result<Vec<SourceDocument>> {
    let mut sources = Vec::with_capacity(docs.len());
    for doc in docs {
        let bytes = tokio::fs::read(absolute(config, &doc.file_path)).await?;
        sources.push(SourceDocument {
            title: doc.title.clone(),
            document_type: doc.document_type,
            bytes,
        });
    }
    Ok(sources)
}
