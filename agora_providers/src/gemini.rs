use std::time::Duration;

use agora_core::{GenerationBackend, GenerationError, GenerationRequest, Role};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::retry::{DEFAULT_RETRY_DELAYS, retry_with_backoff};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const TOP_P: f32 = 0.8;
const TOP_K: u32 = 40;

/// Generation backend over the Gemini `generateContent` REST endpoint.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    retry_delays: Vec<Duration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiProvider {
    /// Create a provider whose every HTTP call is bounded by `timeout`.
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        info!("Creating GeminiProvider");
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.8,
            retry_delays: DEFAULT_RETRY_DELAYS.to_vec(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Temperature used when a request carries no override.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let contents: Vec<Value> = request
            .transcript
            .iter()
            .map(|entry| {
                let role = match entry.role {
                    Role::Persona => "model",
                    Role::User | Role::System => "user",
                };
                json!({ "role": role, "parts": [{ "text": entry.text }] })
            })
            .collect();

        json!({
            "systemInstruction": { "parts": [{ "text": request.system_prompt }] },
            "contents": contents,
            "generationConfig": {
                "temperature": request.temperature.unwrap_or(self.temperature),
                "maxOutputTokens": self.max_tokens,
                "topP": TOP_P,
                "topK": TOP_K,
            },
        })
    }

    /// Helper method to send a single request
    async fn try_send(&self, body: &Value) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status(status, &text));
        }

        extract_text(&text)
    }
}

/// Map a non-success HTTP status to the backend error taxonomy.
fn map_status(status: StatusCode, body: &str) -> GenerationError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(ToString::to_string))
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GenerationError::Timeout,
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            GenerationError::InvalidRequest(detail)
        }
        _ => GenerationError::Unknown(format!("HTTP {}: {detail}", status.as_u16())),
    }
}

fn map_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Unknown(err.to_string())
    }
}

/// Pull the reply text out of a successful response body.
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::Unknown(format!("Invalid response format: {e}")))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::InvalidRequest(format!(
            "Prompt blocked: {reason}"
        )));
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Unknown("empty response".to_string()));
    }
    Ok(text.to_string())
}

#[async_trait]
impl GenerationBackend for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = self.build_body(request);

        info!(
            "Sending request to Gemini API: model={}, turns={}",
            self.model,
            request.transcript.len()
        );

        let result = retry_with_backoff(
            || self.try_send(&body),
            &self.retry_delays,
            GenerationError::is_retryable,
        )
        .await;

        match &result {
            Ok(text) => debug!("Received {} chars from Gemini API", text.len()),
            Err(e) => warn!("Gemini API request failed: {e}"),
        }
        result
    }
}
