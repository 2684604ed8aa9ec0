use strum::{Display, EnumString};

/// File format of an uploaded document.
///
/// Derived from the file extension at upload time and persisted as the
/// lower-case string form (`"pdf"` / `"txt"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Txt,
}

impl DocumentType {
    /// Map a file name to its document type by the text after the last `.`.
    ///
    /// Matching is case-insensitive. Returns `None` for any other extension,
    /// including names without one.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Human-readable label used by the document list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text",
        }
    }
}

/// A stored document handed to the loader.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub title: String,
    pub document_type: DocumentType,
    pub bytes: Vec<u8>,
}

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub content: String,
    /// Title of the document the page came from.
    pub source: String,
    /// Zero-based page index.
    pub page: usize,
}

/// A piece of a page, small enough to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub page: usize,
}

/// A chunk returned by similarity search together with its cosine score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
