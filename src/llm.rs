use anyhow::{Context, Result};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ServiceError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl GenerationConfig {
    /// Bounded settings used for knowledge-base answers.
    pub fn answer() -> Self {
        Self {
            max_output_tokens: 300,
            temperature: 0.2,
            top_p: Some(0.8),
            top_k: Some(40),
        }
    }

    /// Tiny budget used when checking that a key works.
    pub fn probe() -> Self {
        Self {
            max_output_tokens: 50,
            temperature: 0.1,
            top_p: None,
            top_k: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config,
        }
    }
}

/// Outcome of one generation call. Produced once and consumed once.
#[derive(Debug)]
pub enum CallOutcome {
    Success(String),
    Cancelled,
    Failed(ServiceError),
}

impl CallOutcome {
    pub fn into_result(self) -> Result<String, ServiceError> {
        match self {
            CallOutcome::Success(text) => Ok(text),
            CallOutcome::Cancelled => Err(ServiceError::Cancelled),
            CallOutcome::Failed(err) => Err(err),
        }
    }
}

/// Result of a key check, already phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub ok: bool,
    pub message: String,
}

/// Gemini keys start with `AIza` and are comfortably longer than 30 chars.
pub fn validate_api_key(key: &str) -> bool {
    key.starts_with("AIza") && key.len() > 30
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
fn candidate_text(json: &serde_json::Value) -> Option<&str> {
    json["candidates"]
        .get(0)
        .and_then(|c| c["content"]["parts"].get(0))
        .and_then(|p| p["text"].as_str())
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_env() -> Result<Self> {
        let base_url = dotenv::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
        let model = dotenv::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        Self::new(&base_url, &model)
    }

    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        // No client-level timeout: the caller owns the deadline via cancellation.
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn post(
        &self,
        prompt: &str,
        api_key: &str,
        config: GenerationConfig,
    ) -> Result<reqwest::Response, ServiceError> {
        let body = GenerateRequest::new(prompt, config);
        self.client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::from_transport)
    }

    async fn generate_inner(&self, prompt: &str, api_key: &str) -> Result<String, ServiceError> {
        let resp = self.post(prompt, api_key, GenerationConfig::answer()).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::from_status(status));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(ServiceError::from_transport)?;

        match candidate_text(&json) {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(ServiceError::MalformedResponse(
                "no response text received".to_string(),
            )),
        }
    }

    /// Single generation request, abandoned as soon as `cancel` fires.
    pub async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> CallOutcome {
        debug!(prompt_len = prompt.len(), model = %self.model, "generation request");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => CallOutcome::Cancelled,
            result = self.generate_inner(prompt, api_key) => match result {
                Ok(text) => CallOutcome::Success(text),
                Err(err) => CallOutcome::Failed(err),
            },
        }
    }

    /// Send a short test query to check that a key is accepted.
    pub async fn probe(&self, api_key: &str, text: &str) -> ProbeResult {
        if !validate_api_key(api_key) {
            return ProbeResult {
                ok: false,
                message: "Invalid API key format. Keys start with \"AIza\" and are longer than 30 characters."
                    .to_string(),
            };
        }

        let fail = |message: String| ProbeResult { ok: false, message };

        let resp = match self.post(text, api_key, GenerationConfig::probe()).await {
            Ok(resp) => resp,
            Err(_) => {
                return fail(
                    "Network error. Please check your internet connection and API key.".to_string(),
                )
            }
        };

        match resp.status().as_u16() {
            200..=299 => {
                let json: serde_json::Value = resp.json().await.unwrap_or_default();
                if json["candidates"].get(0).and_then(|c| c.get("content")).is_some() {
                    ProbeResult {
                        ok: true,
                        message: "API key is working correctly.".to_string(),
                    }
                } else {
                    fail("API response format error. Please check your key.".to_string())
                }
            }
            400 => fail("Invalid API key. Please check your key format.".to_string()),
            403 => fail("API key is invalid or has no permissions. Please check your key.".to_string()),
            503 => fail(
                "Gemini API service is temporarily unavailable (503). This is a server-side issue, \
                 not your API key. Please try again in a few minutes."
                    .to_string(),
            ),
            code => fail(format!("API key test failed ({}). Please check your key.", code)),
        }
    }
}
