//! Data models for scraped articles and their summaries.
//!
//! - [`ArticleRecord`]: an article page reduced to plain text plus metadata
//! - [`SummaryRecord`]: an article with its summary and derived insights
//! - [`SummaryStrategy`]: which summarizer produced a record
//!
//! Nothing here outlives a single run; records are built by the scraper and
//! summarizer, consumed once by the digest renderer, and dropped.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// Minimum number of whitespace-separated words an article must keep after
/// cleanup to be summarized.
pub const MIN_ARTICLE_WORDS: usize = 100;

/// Highest relevance score a summary can carry.
pub const MAX_RELEVANCE_SCORE: u8 = 10;

/// An article page reduced to its text and metadata.
///
/// Only the scraper constructs these, and only when `content` holds at least
/// [`MIN_ARTICLE_WORDS`] words.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRecord {
    /// The page the article was scraped from.
    pub url: String,
    /// The headline.
    pub title: String,
    /// Cleaned plain-text body.
    pub content: String,
    /// Byline, when the page exposes one.
    pub author: Option<String>,
    /// Publication date exactly as printed on the page.
    pub date: Option<String>,
    /// When the page was scraped.
    pub scraped_at: DateTime<Local>,
}

impl ArticleRecord {
    /// Number of whitespace-separated words in the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// The summarizer that produced a [`SummaryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SummaryStrategy {
    /// Hosted inference endpoint.
    Remote,
    /// Model served on the local machine.
    Local,
    /// Deterministic extractive fallback.
    RuleBased,
}

impl fmt::Display for SummaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SummaryStrategy::Remote => "remote",
            SummaryStrategy::Local => "local",
            SummaryStrategy::RuleBased => "rule-based",
        };
        f.write_str(name)
    }
}

/// An article together with its summary and the heuristics computed from its
/// full content.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRecord {
    pub article: ArticleRecord,
    pub summary: String,
    /// Up to three sentences flagged as significant.
    pub insights: Vec<String>,
    /// Up to five title-cased frequent words.
    pub topics: Vec<String>,
    /// Up to three action-oriented sentences, or generic advice.
    pub takeaways: Vec<String>,
    /// Always within `5..=MAX_RELEVANCE_SCORE`.
    pub relevance_score: u8,
    pub strategy: SummaryStrategy,
    pub summarized_at: DateTime<Local>,
}

impl SummaryRecord {
    /// Topics joined the way the digest prints them.
    pub fn topics_line(&self) -> String {
        self.topics.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(content: &str) -> ArticleRecord {
        ArticleRecord {
            url: "https://example.com/tech/story".to_string(),
            title: "Test".to_string(),
            content: content.to_string(),
            author: None,
            date: None,
            scraped_at: Local::now(),
        }
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        let a = article("  one two\n\nthree\tfour  ");
        assert_eq!(a.word_count(), 4);
    }

    #[test]
    fn test_topics_line() {
        let record = SummaryRecord {
            article: article("body"),
            summary: "Summary".to_string(),
            insights: vec![],
            topics: vec!["Rust".to_string(), "Tokio".to_string()],
            takeaways: vec![],
            relevance_score: 5,
            strategy: SummaryStrategy::RuleBased,
            summarized_at: Local::now(),
        };
        assert_eq!(record.topics_line(), "Rust, Tokio");
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(SummaryStrategy::Remote.to_string(), "remote");
        assert_eq!(SummaryStrategy::Local.to_string(), "local");
        assert_eq!(SummaryStrategy::RuleBased.to_string(), "rule-based");
    }

    #[test]
    fn test_summary_record_serializes() {
        let record = SummaryRecord {
            article: article("body"),
            summary: "Summary".to_string(),
            insights: vec!["Insight".to_string()],
            topics: vec![],
            takeaways: vec![],
            relevance_score: 7,
            strategy: SummaryStrategy::Local,
            summarized_at: Local::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"relevance_score\":7"));
        assert!(json.contains("\"strategy\":\"Local\""));
    }
}
