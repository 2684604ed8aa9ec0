//! Turn stored document bytes into text pages.
//!
//! Text files become a single page. PDFs go through `pdf-extract` on the
//! blocking pool, one page of text per PDF page.

use tracing::debug;

use crate::error::RagError;
use crate::types::{DocumentType, Page, SourceDocument};

/// Extract the text pages of one document.
///
/// Pages with no visible text are skipped, so a scanned PDF without a text
/// layer yields an empty vector rather than an error.
pub async fn load_pages(doc: &SourceDocument) -> Result<Vec<Page>, RagError> {
    let texts = match doc.document_type {
        DocumentType::Txt => vec![decode_text(doc)?],
        DocumentType::Pdf => {
            let bytes = doc.bytes.clone();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
                .await
                .map_err(|e| extract_error(doc, format!("task join error: {e}")))?
                .map_err(|e| extract_error(doc, format!("PDF extraction failed: {e}")))?
        }
    };

    let pages = to_pages(&doc.title, texts);
    debug!(
        source = %doc.title,
        document_type = %doc.document_type,
        pages = pages.len(),
        "document loaded"
    );
    Ok(pages)
}

/// Load every document in order and concatenate their pages.
pub async fn load_all(docs: &[SourceDocument]) -> Result<Vec<Page>, RagError> {
    let mut pages = Vec::new();
    for doc in docs {
        pages.extend(load_pages(doc).await?);
    }
    Ok(pages)
}

fn decode_text(doc: &SourceDocument) -> Result<String, RagError> {
    String::from_utf8(doc.bytes.clone())
        .map_err(|e| extract_error(doc, format!("text file is not valid UTF-8: {e}")))
}

/// Page indices count blank pages too, so they match the source document.
fn to_pages(source: &str, texts: Vec<String>) -> Vec<Page> {
    texts
        .into_iter()
        .enumerate()
        .filter(|(_, content)| !content.trim().is_empty())
        .map(|(page, content)| Page {
            content,
            source: source.to_owned(),
            page,
        })
        .collect()
}

fn extract_error(doc: &SourceDocument, message: String) -> RagError {
    RagError::Extract {
        source_name: doc.title.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txt(title: &str, body: &[u8]) -> SourceDocument {
        SourceDocument {
            title: title.into(),
            document_type: DocumentType::Txt,
            bytes: body.to_vec(),
        }
    }

    #[tokio::test]
    async fn text_document_is_one_page() {
        let pages = load_pages(&txt("Leave", b"Employees get 25 days.")).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "Employees get 25 days.");
        assert_eq!(pages[0].source, "Leave");
        assert_eq!(pages[0].page, 0);
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_extract_error() {
        let err = load_pages(&txt("Bad", &[0xff, 0xfe, 0x00])).await.unwrap_err();
        assert!(matches!(err, RagError::Extract { ref source_name, .. } if source_name == "Bad"));
    }

    #[tokio::test]
    async fn garbage_pdf_is_an_extract_error() {
        let doc = SourceDocument {
            title: "Broken".into(),
            document_type: DocumentType::Pdf,
            bytes: b"definitely not a pdf".to_vec(),
        };
        assert!(matches!(load_pages(&doc).await, Err(RagError::Extract { .. })));
    }

    #[tokio::test]
    async fn pdf_yields_one_page_per_pdf_page() {
        let doc = SourceDocument {
            title: "Leave policy".into(),
            document_type: DocumentType::Pdf,
            bytes: include_bytes!("../testdata/leave_policy.pdf").to_vec(),
        };
        let pages = load_pages(&doc).await.unwrap();
        let indices: Vec<_> = pages.iter().map(|p| p.page).collect();
        assert_eq!(indices, [0, 1]);
        assert!(pages[0].content.contains("Annual"));
        assert!(pages[1].content.contains("Parental"));
        assert!(pages.iter().all(|p| p.source == "Leave policy"));
    }

    #[test]
    fn blank_pages_are_dropped_but_keep_numbering() {
        let texts = vec!["first".to_owned(), "  \n".to_owned(), "third".to_owned()];
        let pages = to_pages("Handbook", texts);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 0);
        assert_eq!(pages[1].page, 2);
        assert_eq!(pages[1].content, "third");
    }

    #[tokio::test]
    async fn load_all_keeps_document_order() {
        let docs = vec![txt("A", b"alpha"), txt("B", b"beta")];
        let pages = load_all(&docs).await.unwrap();
        let sources: Vec<_> = pages.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, ["A", "B"]);
    }
}
