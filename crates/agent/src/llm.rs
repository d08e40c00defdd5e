use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm client is not configured: {0}")]
    NotConfigured(String),
    #[error("llm request failed: {0}")]
    Transport(String),
    #[error("llm request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
    #[error("llm returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response could not be decoded: {0}")]
    Decode(String),
    #[error("llm response contained no text")]
    EmptyResponse,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

fn build_http_client(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| LlmError::NotConfigured(format!("failed to build HTTP client: {error}")))
}

fn transport_error(error: reqwest::Error, timeout: Duration) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout { after_ms: timeout.as_millis() as u64 }
    } else {
        LlmError::Transport(error.to_string())
    }
}

async fn read_json(response: reqwest::Response, timeout: Duration) -> Result<Value, LlmError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "<response unavailable>".to_string());
        return Err(LlmError::Status { status: status.as_u16(), body });
    }

    response.json::<Value>().await.map_err(|error| {
        if error.is_timeout() {
            transport_error(error, timeout)
        } else {
            LlmError::Decode(error.to_string())
        }
    })
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::NotConfigured("gemini api key is empty".to_string()));
        }
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.unwrap_or_else(|| GEMINI_DEFAULT_BASE_URL.to_string()),
            model: model.into(),
            api_key,
            timeout,
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({ "contents": [{ "role": "user", "parts": [{ "text": prompt }] }] });
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| transport_error(error, self.timeout))?;

        let payload = read_json(response, self.timeout).await?;
        gemini_text(&payload).ok_or(LlmError::EmptyResponse)
    }
}

/// Concatenated text parts of the first Gemini candidate.
pub fn gemini_text(payload: &Value) -> Option<String> {
    let parts = payload.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String =
        parts.iter().filter_map(|part| part.get("text").and_then(Value::as_str)).collect();
    (!text.trim().is_empty()).then_some(text)
}

/// Local Ollama `/api/generate` without streaming.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(LlmError::NotConfigured("ollama base url is empty".to_string()));
        }
        Ok(Self { http: build_http_client(timeout)?, base_url, model: model.into(), timeout })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn provider(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({ "model": self.model, "prompt": prompt, "stream": false, "format": "json" });
        let response = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|error| transport_error(error, self.timeout))?;

        let payload = read_json(response, self.timeout).await?;
        payload
            .get("response")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}
