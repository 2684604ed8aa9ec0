//! Text embedding.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RagError;
use crate::gemini::{GeminiConfig, model_path};

pub const DEFAULT_EMBEDDING_MODEL: &str = "models/gemini-embedding-001";

/// The API rejects batches larger than this.
const MAX_BATCH: usize = 100;

/// Produces dense vectors for text.
///
/// Documents and queries are embedded separately because retrieval-tuned
/// models use a different task hint for each side.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError>;
}

/// [`Embedder`] backed by Gemini `batchEmbedContents`.
pub struct GeminiEmbedder {
    config: GeminiConfig,
    model: String,
    client: Client,
}

impl GeminiEmbedder {
    pub fn new(config: GeminiConfig, model: impl Into<String>) -> Result<Self, RagError> {
        let client = config.client()?;
        Ok(Self {
            config,
            model: model_path(&model.into()),
            client,
        })
    }

    async fn embed_batch(&self, texts: &[String], task: TaskType) -> Result<Vec<Vec<f32>>, RagError> {
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &self.model,
                    content: Content {
                        parts: vec![Part { text }],
                    },
                    task_type: task,
                })
                .collect(),
        };
        let resp: BatchEmbedResponse = self
            .config
            .call(&self.client, &self.model, "batchEmbedContents", &body)
            .await?;

        if resp.embeddings.len() != texts.len() {
            return Err(RagError::Decode(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                resp.embeddings.len()
            )));
        }
        Ok(resp.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            out.extend(self.embed_batch(batch, TaskType::RetrievalDocument).await?);
        }
        debug!(model = %self.model, count = out.len(), "embedded documents");
        Ok(out)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_batch(&[text.to_owned()], TaskType::RetrievalQuery)
            .await?
            .pop()
            .ok_or(RagError::EmptyResponse)
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_api_shape() {
        let text = "sick leave".to_owned();
        let body = BatchEmbedRequest {
            requests: vec![EmbedContentRequest {
                model: "models/gemini-embedding-001",
                content: Content {
                    parts: vec![Part { text: &text }],
                },
                task_type: TaskType::RetrievalQuery,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["requests"][0]["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(json["requests"][0]["content"]["parts"][0]["text"], "sick leave");
        assert_eq!(json["requests"][0]["model"], "models/gemini-embedding-001");
    }

    #[test]
    fn response_without_embeddings_decodes_empty() {
        let resp: BatchEmbedResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.embeddings.is_empty());
    }

    #[test]
    fn model_name_is_normalised() {
        let embedder = GeminiEmbedder::new(GeminiConfig::new("k"), "gemini-embedding-001").unwrap();
        assert_eq!(embedder.model, DEFAULT_EMBEDDING_MODEL);
    }
}
