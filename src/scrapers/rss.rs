//! RSS feed indexing.
//!
//! Reads the first `max_items` `<item>` elements of a feed and keeps the
//! links whose URL mentions one of the configured keywords.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Fetch a feed and return the keyword-matching article links.
///
/// Never fails: network, status and parse errors are logged and produce an
/// empty list.
#[instrument(level = "info", skip(client, keywords))]
pub async fn index_articles(
    client: &Client,
    feed_url: &str,
    max_items: usize,
    keywords: &[String],
) -> Vec<String> {
    match fetch_feed(client, feed_url).await {
        Ok(xml) => match item_links(&xml, max_items) {
            Ok(links) => {
                let links = resolve_links(feed_url, links);
                let total = links.len();
                let urls = filter_by_keywords(links, keywords);
                info!(
                    count = urls.len(),
                    examined = total,
                    "Found {} relevant articles from RSS feed",
                    urls.len()
                );
                debug!(urls = ?urls, "Feed URLs");
                urls
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse RSS feed");
                Vec::new()
            }
        },
        Err(e) => {
            warn!(error = %e, "Failed to fetch RSS feed");
            Vec::new()
        }
    }
}

async fn fetch_feed(client: &Client, feed_url: &str) -> Result<String, Box<dyn Error>> {
    let body = client
        .get(feed_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// Resolve possibly relative links against the feed URL, dropping any that
/// cannot be parsed.
pub fn resolve_links(feed_url: &str, links: Vec<String>) -> Vec<String> {
    let base = Url::parse(feed_url).ok();
    links
        .into_iter()
        .filter_map(|link| {
            let resolved = match &base {
                Some(base) => base.join(&link),
                None => Url::parse(&link),
            };
            match resolved {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    debug!(%link, error = %e, "Skipping unparseable link");
                    None
                }
            }
        })
        .collect()
}

/// Keep the URLs that contain at least one keyword, ignoring case.
pub fn filter_by_keywords(urls: Vec<String>, keywords: &[String]) -> Vec<String> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    urls.into_iter()
        .filter(|url| {
            let lowered = url.to_lowercase();
            keywords.iter().any(|k| lowered.contains(k.as_str()))
        })
        .collect()
}

/// Extract the `<link>` text of the first `max_items` `<item>` elements.
///
/// Only the first `<link>` of an item is read. Items without a non-empty
/// link still count toward `max_items`.
pub fn item_links(xml: &str, max_items: usize) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut links = Vec::new();
    let mut items_seen = 0usize;
    let mut in_item = false;
    let mut seen_link = false;
    let mut link: Option<String> = None;

    loop {
        if items_seen >= max_items && !in_item {
            break;
        }
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"item" => {
                    in_item = true;
                    seen_link = false;
                    items_seen += 1;
                }
                b"link" if in_item && !seen_link => {
                    seen_link = true;
                    link = Some(String::new());
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(buf) = link.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::CData(c) => {
                if let Some(buf) = link.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::GeneralRef(r) => {
                if let Some(buf) = link.as_mut() {
                    let name = String::from_utf8_lossy(&r);
                    if let Some(resolved) = resolve_reference(&name) {
                        buf.push_str(&resolved);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"link" => {
                    if let Some(text) = link.take() {
                        let text = text.trim();
                        if !text.is_empty() {
                            links.push(text.to_string());
                        }
                    }
                }
                b"item" => {
                    in_item = false;
                    link = None;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(links)
}

/// Resolve `amp`, `#38` or `#x26` style references.
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}
