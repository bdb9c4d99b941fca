//! LLM collaborator: the single place that talks to the generation endpoint.
//!
//! The pipeline depends only on the [`Generator`] trait. [`OllamaClient`] is
//! the production implementation, a blocking JSON-over-HTTP client for an
//! Ollama-style `/api/generate` endpoint.
//!
//! Debug logs never include prompt text; only its length is recorded.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single generation call produced no usable text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not reach LLM endpoint {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("LLM endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode LLM response: {0}")]
    Decode(String),

    #[error("LLM endpoint reported an error: {0}")]
    Api(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,
}

/// Anything that can turn a prompt into text.
pub trait Generator {
    fn generate(
        &self,
        prompt: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String, GenerationError>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(
        &self,
        prompt: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String, GenerationError> {
        (**self).generate(prompt, model, temperature)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Blocking client for an Ollama-compatible generate endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    /// Build a client for `endpoint`. Requests have no timeout; a call either
    /// completes or fails at the transport level.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GenerationError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|source| GenerationError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Generator for OllamaClient {
    fn generate(
        &self,
        prompt: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature },
        };

        debug!(
            endpoint = %self.endpoint,
            model,
            temperature,
            prompt_len = prompt.len(),
            "sending generate request"
        );
        let start = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|source| GenerationError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let text = response.text().map_err(|source| GenerationError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        debug!(
            status = status.as_u16(),
            body_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generate response received"
        );

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "LLM endpoint returned error status");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_response(&text)
    }
}

/// Extract the generated text from a successful response body.
fn parse_response(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;

    if let Some(err) = parsed.error {
        return Err(GenerationError::Api(err));
    }

    match parsed.response {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(GenerationError::EmptyResponse),
        None => Err(GenerationError::Decode(
            "missing `response` field".to_owned(),
        )),
    }
}
