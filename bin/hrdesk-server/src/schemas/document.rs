use crate::entities::DocumentRecord;
use hrdesk_rag::DocumentType;
use serde::Serialize;
use validator::{Validate, ValidationError};

pub const MAX_TITLE_CHARS: usize = 255;

/// What the upload handler read from the multipart body. The bytes
/// themselves travel separately.
#[derive(Debug, Clone, Default, Validate)]
pub struct UploadForm {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_file"))]
    pub file: FileField,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileField {
    /// Client-supplied file name; empty when no file part was sent.
    pub name: String,
    pub size: usize,
}

impl UploadForm {
    /// Only meaningful once [`Validate::validate`] passed.
    pub fn document_type(&self) -> Option<DocumentType> {
        DocumentType::from_file_name(&self.file.name)
    }
}

fn required() -> ValidationError {
    ValidationError::new("required").with_message("This field is required.".into())
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(required());
    }
    let chars = title.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(ValidationError::new("max_length").with_message(
            format!("Ensure this value has at most {MAX_TITLE_CHARS} characters (it has {chars}).")
                .into(),
        ));
    }
    Ok(())
}

fn validate_file(file: &FileField) -> Result<(), ValidationError> {
    if file.name.is_empty() {
        return Err(required());
    }
    if DocumentType::from_file_name(&file.name).is_none() {
        return Err(ValidationError::new("extension")
            .with_message("Only PDF and TXT files are allowed.".into()));
    }
    if file.size == 0 {
        return Err(ValidationError::new("empty").with_message("The submitted file is empty.".into()));
    }
    Ok(())
}

/// A document row as the list and delete pages render it.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: i64,
    pub title: String,
    pub file_name: String,
    pub document_type: &'static str,
    pub uploaded_at: String,
    pub uploader: String,
}

impl DocumentRecord {
    pub fn to_view(&self) -> DocumentView {
        DocumentView {
            id: self.id,
            title: self.title.clone(),
            file_name: self.file_name.clone(),
            document_type: self.document_type.label(),
            uploaded_at: self.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
            uploader: self.uploader.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::field_errors;

    fn form(title: &str, name: &str, size: usize) -> UploadForm {
        UploadForm {
            title: title.to_owned(),
            file: FileField { name: name.to_owned(), size },
        }
    }

    #[test]
    fn pdf_and_txt_are_accepted() {
        let pdf = form("Leave policy", "leave.PDF", 10);
        assert!(pdf.validate().is_ok());
        assert_eq!(pdf.document_type(), Some(DocumentType::Pdf));

        let txt = form("Travel", "travel.txt", 10);
        assert!(txt.validate().is_ok());
        assert_eq!(txt.document_type(), Some(DocumentType::Txt));
    }

    #[test]
    fn other_extensions_are_rejected() {
        for name in ["handbook.docx", "notes", "archive.pdf.zip"] {
            let errors = form("Handbook", name, 10).validate().unwrap_err();
            assert_eq!(
                field_errors(&errors)["file"],
                vec!["Only PDF and TXT files are allowed.".to_owned()]
            );
        }
    }

    #[test]
    fn title_and_file_are_required() {
        let errors = form("  ", "", 0).validate().unwrap_err();
        let fields = field_errors(&errors);
        assert_eq!(fields["title"], vec!["This field is required.".to_owned()]);
        assert_eq!(fields["file"], vec!["This field is required.".to_owned()]);
    }

    #[test]
    fn long_titles_and_empty_files_are_rejected() {
        let errors = form(&"t".repeat(256), "a.txt", 0).validate().unwrap_err();
        let fields = field_errors(&errors);
        assert!(fields["title"][0].starts_with("Ensure this value has at most 255"));
        assert_eq!(fields["file"], vec!["The submitted file is empty.".to_owned()]);
        assert!(form(&"t".repeat(255), "a.txt", 1).validate().is_ok());
    }
}
