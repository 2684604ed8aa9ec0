use thiserror::Error;

/// Errors raised anywhere along the retrieval / generation chain.
///
/// The server collapses all of these into one apology for the end user, so
/// the variants exist for logging rather than for control flow.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("failed to extract text from '{source_name}': {message}")]
    Extract {
        source_name: String,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("invalid configuration: {0}")]
    Config(String),
}
