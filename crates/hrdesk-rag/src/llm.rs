//! Chat completion.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RagError;
use crate::gemini::{GeminiConfig, model_path};

pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;

/// A single-turn prompt: system instruction plus the user's question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub human: String,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, RagError>;
}

/// [`ChatModel`] backed by Gemini `generateContent`.
pub struct GeminiChat {
    config: GeminiConfig,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    client: Client,
}

impl GeminiChat {
    pub fn new(config: GeminiConfig, model: impl Into<String>) -> Result<Self, RagError> {
        let client = config.client()?;
        Ok(Self {
            config,
            model: model_path(&model.into()),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            client,
        })
    }

    pub fn with_sampling(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn request<'a>(&self, prompt: &'a ChatPrompt) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &prompt.human,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, RagError> {
        let resp: GenerateResponse = self
            .config
            .call(&self.client, &self.model, "generateContent", &self.request(prompt))
            .await?;
        let text = resp.first_text().ok_or(RagError::EmptyResponse)?;
        debug!(model = %self.model, output_len = text.len(), "generation done");
        Ok(text)
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if it has any text.
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_system_instruction_and_sampling() {
        let chat = GeminiChat::new(GeminiConfig::new("k"), DEFAULT_CHAT_MODEL).unwrap();
        let prompt = ChatPrompt {
            system: "be brief".into(),
            human: "How many leave days?".into(),
        };
        let json = serde_json::to_value(chat.request(&prompt)).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "How many leave days?");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 500);
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn response_parts_are_concatenated() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"You get "},{"text":"25 days."}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("You get 25 days."));
    }

    #[test]
    fn blocked_or_empty_response_has_no_text() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(resp.first_text().is_none());
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(resp.first_text().is_none());
    }
}
