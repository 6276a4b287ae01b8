//! HTTP adapter over the embedding endpoints.
//!
//! Two wire protocols are supported, fixed at construction: Ollama's
//! native API and the OpenAI-compatible API many local runtimes expose.
//! Callers never learn which one is active; they hand over text and get
//! a vector back.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which protocol the endpoint speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireProtocol {
    /// Ollama native: `POST {base}/api/embeddings`, no auth.
    Native { base_url: String },
    /// OpenAI-compatible: `POST {base}/embeddings` with bearer auth.
    OpenAi { base_url: String, api_key: String },
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub protocol: WireProtocol,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed embedding payload: {0}")]
    Malformed(String),
}

#[derive(Serialize)]
struct NativeRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct NativeResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

pub struct EmbeddingClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl EmbeddingClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(EmbeddingClient { http, config })
    }

    /// Embeds one text. Whitespace runs are collapsed first so records
    /// with multi-line descriptions embed the same as single-line ones.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let normalized = normalize_whitespace(text);

        let vector = match &self.config.protocol {
            WireProtocol::Native { base_url } => self.embed_native(base_url, &normalized).await?,
            WireProtocol::OpenAi { base_url, api_key } => {
                self.embed_openai(base_url, api_key, &normalized).await?
            }
        };

        // Numbers beyond f32 range decode to infinity; serde_json writes
        // non-finite floats back as null, which never parses as f32 again.
        if vector.iter().any(|component| !component.is_finite()) {
            return Err(ProviderError::Malformed(
                "non-finite embedding component".to_string(),
            ));
        }

        Ok(vector)
    }

    async fn embed_native(&self, base_url: &str, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/api/embeddings", base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&NativeRequest {
                model: &self.config.model,
                prompt: text,
            })
            .send()
            .await?;

        let payload: NativeResponse = decode(response).await?;
        Ok(payload.embedding)
    }

    async fn embed_openai(
        &self,
        base_url: &str,
        api_key: &str,
        text: &str,
    ) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/embeddings", base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&OpenAiRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await?;

        let payload: OpenAiResponse = decode(response).await?;
        let first = payload
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("empty data array".to_string()))?;

        Ok(first.embedding)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status { status, body });
    }

    response
        .json()
        .await
        .map_err(|err| ProviderError::Malformed(err.to_string()))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
