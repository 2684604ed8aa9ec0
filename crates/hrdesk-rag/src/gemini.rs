//! Shared plumbing for the Google Generative Language REST API.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::GEMINI_BASE_URL;
use crate::error::RagError;

/// Connection settings shared by [`crate::GeminiEmbedder`] and
/// [`crate::GeminiChat`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    pub(crate) fn client(&self) -> Result<Client, RagError> {
        Ok(Client::builder().timeout(self.timeout).build()?)
    }

    /// `POST {base_url}/{model}:{method}` with the API key header.
    pub(crate) async fn call<B, R>(
        &self,
        client: &Client,
        model: &str,
        method: &str,
        body: &B,
    ) -> Result<R, RagError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if self.api_key.is_empty() {
            return Err(RagError::Config("GOOGLE_API_KEY is not set".into()));
        }
        let url = format!(
            "{}/{}:{}",
            self.base_url.trim_end_matches('/'),
            model_path(model),
            method
        );
        let resp = client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(RagError::Api { status, message });
        }
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RagError::Decode(e.to_string()))
    }
}

/// Normalise a model id to the `models/<name>` resource form.
pub(crate) fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_owned()
    } else {
        format!("models/{model}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_adds_prefix_once() {
        assert_eq!(model_path("gemini-1.5-flash"), "models/gemini-1.5-flash");
        assert_eq!(model_path("models/gemini-embedding-001"), "models/gemini-embedding-001");
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let cfg = GeminiConfig::new("");
        let client = cfg.client().unwrap();
        let result: Result<serde_json::Value, _> =
            cfg.call(&client, "gemini-1.5-flash", "generateContent", &serde_json::json!({})).await;
        assert!(matches!(result, Err(RagError::Config(_))));
    }
}
