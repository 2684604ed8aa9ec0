//! Retrieval-augmented answering over uploaded HR policy documents.
//!
//! The pipeline is a straight call chain with no state kept between calls:
//!
//! ```text
//! SourceDocument ─► loader ─► splitter ─► Embedder ─► VectorIndex
//!                                                        │ top-5
//! query ─────────────────────────────► Embedder ─────────┘
//!                                                        ▼
//!                                       prompt ─► ChatModel ─► answer
//! ```
//!
//! External capabilities (embeddings, generation) sit behind the
//! [`Embedder`] and [`ChatModel`] traits so the server can swap the Gemini
//! clients for fakes in tests.

pub mod embed;
pub mod error;
pub mod gemini;
pub mod index;
pub mod llm;
pub mod loader;
pub mod pipeline;
pub mod prompt;
pub mod splitter;
pub mod types;

pub use embed::{Embedder, GeminiEmbedder};
pub use error::RagError;
pub use gemini::GeminiConfig;
pub use index::VectorIndex;
pub use llm::{ChatModel, ChatPrompt, GeminiChat};
pub use pipeline::{RagPipeline, TOP_K};
pub use splitter::RecursiveTextSplitter;
pub use types::{Chunk, DocumentType, Page, ScoredChunk, SourceDocument};

/// Default base URL of the Google Generative Language REST API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
