//! Article page scraping.
//!
//! Pages come from many publishers, so each field is located with an ordered
//! list of CSS selectors and the first one that yields usable text wins. Only
//! the first element matching a selector is examined. When no content
//! selector matches, the first `div` holding more than 1000 characters of
//! text is used instead.

use crate::models::{ArticleRecord, MIN_ARTICLE_WORDS};
use crate::utils::collapse_whitespace;
use chrono::Local;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&["h1", "h2", ".title", ".post-title", ".entry-title", ".article-title"])
});

static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        ".entry-content",
        "main",
        "article",
        ".content",
        ".post-body",
        ".article-body",
        ".post-content",
        ".story-body",
        ".wp-block-post-content",
        ".article-content",
    ])
});

static AUTHOR_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[".author", ".byline", ".post-author", ".entry-author", ".writer"])
});

static DATE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[".date", ".published-date", ".post-date", ".entry-date", "time"])
});

/// Page furniture dropped from a matched content element.
static CONTENT_NOISE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "script, style, nav, header, footer, .ads, .advertisement, .wp-block-buttons, .wp-block-columns",
    )
    .unwrap()
});

/// Page furniture dropped from a fallback `div`.
static FALLBACK_NOISE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style, nav, header, footer").unwrap());

static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());

/// Phrases stripped from article text after whitespace is collapsed.
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "advertisement",
    "sponsored",
    "subscribe",
    "newsletter",
    "privacy policy",
    "terms of service",
    "cookie policy",
];

/// A matched content element must hold more characters than this.
const MIN_CONTENT_CHARS: usize = 100;
/// A fallback `div` must hold more characters than this.
const MIN_FALLBACK_CHARS: usize = 1000;

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

/// Why a fetched page did not become an [`ArticleRecord`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("no title found")]
    MissingTitle,
    #[error("no content found")]
    MissingContent,
    #[error("content too short ({words} words)")]
    TooShort { words: usize },
}

/// Fetch and scrape one article.
///
/// Any failure (network error, non-success status, unusable page) is logged
/// and yields `None`.
#[instrument(level = "info", skip(client))]
pub async fn fetch_article(client: &Client, url: &str) -> Option<ArticleRecord> {
    info!("Scraping article");
    match fetch_page(client, url).await {
        Ok(html) => match extract_article(url, &html) {
            Ok(article) => {
                info!(
                    title = %article.title,
                    words = article.word_count(),
                    "Scraped article"
                );
                Some(article)
            }
            Err(reason) => {
                warn!(%reason, "Could not extract article");
                None
            }
        },
        Err(e) => {
            error!(error = %e, "Article fetch failed");
            None
        }
    }
}

async fn fetch_page(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!(bytes = body.len(), "Fetched article page");
    Ok(body)
}

/// Turn an article page into an [`ArticleRecord`].
pub fn extract_article(url: &str, html: &str) -> Result<ArticleRecord, Rejection> {
    let document = Html::parse_document(html);

    let title = first_text(&document, &TITLE_SELECTORS).ok_or(Rejection::MissingTitle)?;
    let raw_content = extract_content(&document).ok_or(Rejection::MissingContent)?;
    let content = clean_content(&raw_content);

    let words = content.split_whitespace().count();
    if words < MIN_ARTICLE_WORDS {
        return Err(Rejection::TooShort { words });
    }

    Ok(ArticleRecord {
        url: url.to_string(),
        title,
        content,
        author: first_text(&document, &AUTHOR_SELECTORS),
        date: first_text(&document, &DATE_SELECTORS),
        scraped_at: Local::now(),
    })
}

/// Text of the first selector whose first match is non-blank.
fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let element = document.select(selector).next()?;
        let text = collapse_whitespace(&element.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    })
}

fn extract_content(document: &Html) -> Option<String> {
    let matched = CONTENT_SELECTORS.iter().find_map(|selector| {
        let element = document.select(selector).next()?;
        let text = visible_text(element, &CONTENT_NOISE);
        (text.chars().count() > MIN_CONTENT_CHARS).then_some(text)
    });

    matched.or_else(|| {
        debug!("No content selector matched; scanning divs");
        document
            .select(&DIV)
            .find(|div| {
                let raw: String = div.text().collect();
                raw.trim().chars().count() > MIN_FALLBACK_CHARS
            })
            .map(|div| visible_text(div, &FALLBACK_NOISE))
    })
}

/// Text under `element`, skipping anything inside an element matching `noise`.
///
/// Text nodes are concatenated as-is so inline markup never splits a word.
fn visible_text(element: ElementRef<'_>, noise: &Selector) -> String {
    let skipped: Vec<_> = element.select(noise).map(|e| e.id()).collect();
    let text: String = element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            if node.ancestors().any(|a| skipped.contains(&a.id())) {
                return None;
            }
            Some(&**text)
        })
        .collect();
    text.trim().to_string()
}

/// Collapse whitespace and strip boilerplate phrases.
pub fn clean_content(content: &str) -> String {
    let mut cleaned = collapse_whitespace(content);
    for phrase in BOILERPLATE_PHRASES {
        cleaned = cleaned.replace(phrase, "");
    }
    collapse_whitespace(&cleaned)
}
