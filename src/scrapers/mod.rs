//! Fetching article links from feeds and article text from pages.
//!
//! Both phases share one HTTP client that presents a desktop browser
//! user-agent and gives up on any request after 30 seconds.
//!
//! | Phase | Module | Input | Output |
//! |-------|--------|-------|--------|
//! | Indexing | [`rss`] | RSS feed URL | Keyword-matching article URLs |
//! | Fetching | [`article`] | Article URL | [`ArticleRecord`](crate::models::ArticleRecord) |
//!
//! Failures never cross these boundaries: a feed that cannot be read yields
//! no URLs and an article that cannot be scraped yields no record. Both are
//! logged and the run moves on.

use reqwest::Client;
use std::time::Duration;

pub mod article;
pub mod rss;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the client used for every feed, page and model request.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}
