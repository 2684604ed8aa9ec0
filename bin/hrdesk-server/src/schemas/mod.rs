pub mod chat;
pub mod document;

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Field name → messages, the shape both the chat JSON and the upload form
/// render.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
