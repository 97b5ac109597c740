//! Model-backed summarization over HTTP.
//!
//! # Architecture
//!
//! - [`SummarizeAsync`]: core trait for anything that turns article text into
//!   a summary
//! - [`HuggingFaceClient`]: hosted inference endpoint, bearer-token auth
//! - [`OllamaClient`]: model served on the local machine
//!
//! Neither client retries. A non-200 status, a malformed body or a transport
//! error is returned as a [`SummarizeError`] and the caller moves on to the
//! next strategy.

use super::SummarizeError;
use crate::utils::{truncate_chars, truncate_for_log};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Characters of article text sent to the hosted model.
pub const REMOTE_INPUT_CHARS: usize = 1000;
/// Characters of article text sent to the local model.
pub const LOCAL_INPUT_CHARS: usize = 2000;

const LOCAL_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const LOCAL_GENERATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for async summarization backends.
pub trait SummarizeAsync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Summarize `text`, which is the full article content.
    ///
    /// Implementations decide how much of the text they send.
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

#[derive(Debug, Deserialize)]
struct HuggingFaceSummary {
    summary_text: String,
}

/// Client for a hosted summarization model such as `facebook/bart-large-cnn`.
pub struct HuggingFaceClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for HuggingFaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HuggingFaceClient {
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }
}

impl SummarizeAsync for HuggingFaceClient {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let t0 = Instant::now();
        let input = truncate_chars(text, REMOTE_INPUT_CHARS);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "inputs": input }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(
                %status,
                elapsed_ms = t0.elapsed().as_millis(),
                body = %truncate_for_log(&body, 200),
                "Hugging Face API returned an error status"
            );
            return Err(SummarizeError::Status(status));
        }

        let body: Vec<HuggingFaceSummary> = response.json().await?;
        let summary = body
            .into_iter()
            .next()
            .map(|s| s.summary_text.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(SummarizeError::MalformedResponse("missing summary_text"))?;

        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            chars = summary.chars().count(),
            "Hugging Face summary received"
        );
        Ok(summary)
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerate {
    response: String,
}

/// Client for an Ollama server.
///
/// Every call first probes `/api/tags` so an absent server is detected
/// quickly instead of waiting out the generation timeout.
#[derive(Debug)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(client: Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn is_reachable(&self) -> Result<(), SummarizeError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(LOCAL_PROBE_TIMEOUT)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(SummarizeError::Status(status)),
        }
    }
}

impl SummarizeAsync for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    #[instrument(level = "info", skip_all, fields(base_url = %self.base_url, model = %self.model))]
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.is_reachable().await?;
        debug!("Ollama is reachable");

        let t0 = Instant::now();
        let input = truncate_chars(text, LOCAL_INPUT_CHARS);
        let response = self
            .client
            .post(self.url("/api/generate"))
            .timeout(LOCAL_GENERATE_TIMEOUT)
            .json(&json!({
                "model": self.model,
                "prompt": format!("Summarize this article in 2-3 sentences:\n\n{input}"),
                "stream": false,
            }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SummarizeError::Status(status));
        }

        let body: OllamaGenerate = response.json().await?;
        let summary = body.response.trim().to_string();
        if summary.is_empty() {
            return Err(SummarizeError::MalformedResponse("empty response"));
        }

        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            chars = summary.chars().count(),
            "Ollama summary received"
        );
        Ok(summary)
    }
}
