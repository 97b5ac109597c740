//! Article summarization with an ordered fallback chain.
//!
//! Strategies are tried in priority order and the first success wins:
//!
//! 1. Hosted model ([`api::HuggingFaceClient`]), only when a token is configured
//! 2. Local model ([`api::OllamaClient`]), only when the server answers
//! 3. Rule-based extractive summary ([`heuristics::rule_based_summary`])
//!
//! Whatever produced the summary, insights, topics, takeaways and the
//! relevance score are always computed from the full article text by
//! [`heuristics`].

pub mod api;
pub mod heuristics;

use crate::config::SummarizerConfig;
use crate::models::{ArticleRecord, SummaryRecord, SummaryStrategy};
use api::{HuggingFaceClient, OllamaClient, SummarizeAsync};
use chrono::Local;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("malformed model response: {0}")]
    MalformedResponse(&'static str),

    #[error("article has no text to summarize")]
    EmptyContent,
}

/// A model-backed strategy in the chain.
#[derive(Debug)]
pub enum ModelBackend {
    Remote(HuggingFaceClient),
    Local(OllamaClient),
}

impl ModelBackend {
    fn strategy(&self) -> SummaryStrategy {
        match self {
            ModelBackend::Remote(_) => SummaryStrategy::Remote,
            ModelBackend::Local(_) => SummaryStrategy::Local,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ModelBackend::Remote(c) => c.name(),
            ModelBackend::Local(c) => c.name(),
        }
    }

    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        match self {
            ModelBackend::Remote(c) => c.summarize(text).await,
            ModelBackend::Local(c) => c.summarize(text).await,
        }
    }
}

/// Rule-based summary; fails only when there is no text at all.
pub fn rule_based(content: &str) -> Result<String, SummarizeError> {
    if content.trim().is_empty() {
        return Err(SummarizeError::EmptyContent);
    }
    Ok(heuristics::rule_based_summary(content))
}

/// Runs the strategy chain and assembles [`SummaryRecord`]s.
#[derive(Debug)]
pub struct Summarizer {
    backends: Vec<ModelBackend>,
    keywords: Vec<String>,
}

impl Summarizer {
    /// Build a summarizer trying `backends` in order before the rule-based
    /// fallback. `keywords` feed the relevance score.
    pub fn new(backends: Vec<ModelBackend>, keywords: Vec<String>) -> Self {
        Self { backends, keywords }
    }

    /// Remote backend when a token is configured, then the local backend.
    pub fn from_config(client: &Client, config: &SummarizerConfig, keywords: Vec<String>) -> Self {
        let mut backends = Vec::new();
        match &config.huggingface_token {
            Some(token) => backends.push(ModelBackend::Remote(HuggingFaceClient::new(
                client.clone(),
                config.huggingface_url.clone(),
                token.clone(),
            ))),
            None => info!("No Hugging Face token found, skipping hosted summaries"),
        }
        backends.push(ModelBackend::Local(OllamaClient::new(
            client.clone(),
            config.ollama_url.clone(),
            config.ollama_model.clone(),
        )));
        Self::new(backends, keywords)
    }

    /// Summarize one article.
    ///
    /// If the chain fails as a whole, the rule-based summary is attempted
    /// once more explicitly; if that also fails the article is dropped and
    /// `None` is returned.
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    pub async fn summarize(&self, article: ArticleRecord) -> Option<SummaryRecord> {
        info!(title = %article.title, "Summarizing article");
        let outcome = match self.run_chain(&article.content).await {
            Ok(found) => Ok(found),
            Err(e) => {
                warn!(error = %e, "Summarization failed; falling back to rule-based summary");
                rule_based(&article.content).map(|s| (s, SummaryStrategy::RuleBased))
            }
        };

        match outcome {
            Ok((summary, strategy)) => {
                info!(%strategy, "Article summarized");
                Some(self.build_record(article, summary, strategy))
            }
            Err(e) => {
                error!(error = %e, "Fallback summarization also failed; dropping article");
                None
            }
        }
    }

    async fn run_chain(&self, content: &str) -> Result<(String, SummaryStrategy), SummarizeError> {
        for backend in &self.backends {
            match backend.summarize(content).await {
                Ok(summary) => return Ok((summary, backend.strategy())),
                Err(e) => debug!(backend = backend.name(), error = %e, "Strategy unavailable; trying next"),
            }
        }
        rule_based(content).map(|s| (s, SummaryStrategy::RuleBased))
    }

    fn build_record(
        &self,
        article: ArticleRecord,
        summary: String,
        strategy: SummaryStrategy,
    ) -> SummaryRecord {
        let content = &article.content;
        let insights = heuristics::key_insights(content);
        let topics = heuristics::extract_topics(content);
        let takeaways = heuristics::extract_takeaways(content);
        let relevance_score = heuristics::relevance_score(content, &self.keywords);
        SummaryRecord {
            summary,
            insights,
            topics,
            takeaways,
            relevance_score,
            strategy,
            summarized_at: Local::now(),
            article,
        }
    }
}
