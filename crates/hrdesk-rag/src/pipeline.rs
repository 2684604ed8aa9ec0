//! The end-to-end question answering chain.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embed::Embedder;
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::llm::ChatModel;
use crate::loader;
use crate::prompt;
use crate::splitter::RecursiveTextSplitter;
use crate::types::SourceDocument;

/// Number of chunks handed to the model per question.
pub const TOP_K: usize = 5;

#[derive(Clone)]
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn ChatModel>,
    splitter: RecursiveTextSplitter,
}

impl RagPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, llm: Arc<dyn ChatModel>) -> Self {
        Self {
            embedder,
            llm,
            splitter: RecursiveTextSplitter::default(),
        }
    }

    pub fn with_splitter(mut self, splitter: RecursiveTextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Load, split and embed `docs` into a fresh index.
    ///
    /// Nothing is cached: every call re-reads and re-embeds every document.
    pub async fn build_index(&self, docs: &[SourceDocument]) -> Result<VectorIndex, RagError> {
        let pages = loader::load_all(docs).await?;
        let chunks = self.splitter.split_pages(&pages);
        debug!(documents = docs.len(), pages = pages.len(), chunks = chunks.len(), "documents split");
        VectorIndex::from_chunks(self.embedder.as_ref(), chunks).await
    }

    /// Retrieve the [`TOP_K`] nearest chunks for `query` and generate an answer.
    pub async fn answer(&self, index: &VectorIndex, query: &str) -> Result<String, RagError> {
        let query_vector = self.embedder.embed_query(query).await?;
        let retrieved = index.similarity_search(&query_vector, TOP_K);
        debug!(retrieved = retrieved.len(), "context retrieved");
        let answer = self.llm.generate(&prompt::build(query, &retrieved)).await?;
        info!(answer_len = answer.len(), "answer generated");
        Ok(answer)
    }

    pub async fn respond(&self, docs: &[SourceDocument], query: &str) -> Result<String, RagError> {
        let index = self.build_index(docs).await?;
        self.answer(&index, query).await
    }
}
