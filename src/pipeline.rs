//! The end-to-end digest workflow.
//!
//! 1. **Indexing**: read each feed, keeping at most `max_articles / feeds`
//!    items per feed
//! 2. **Merging**: deduplicate across feeds (first seen wins), cap at
//!    `max_articles`
//! 3. **Processing**: scrape then summarize each URL in turn, pausing between
//!    articles
//! 4. **Delivery**: send one digest if anything survived

use crate::config::Settings;
use crate::models::SummaryRecord;
use crate::outputs::email::DigestSender;
use crate::scrapers::{article, rss};
use crate::summarizer::Summarizer;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::Client;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// What happened to the digest at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No article survived, so nothing was sent.
    NotAttempted,
    Sent,
    Failed,
}

/// Counters describing one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Unique URLs left after merging and capping.
    pub discovered: usize,
    /// URLs that were scraped.
    pub processed: usize,
    /// Articles that made it into the digest.
    pub succeeded: usize,
    pub delivery: Delivery,
}

/// Collect candidate URLs from every feed, deduplicated and capped.
#[instrument(level = "info", skip_all, fields(feeds = settings.feeds.len()))]
pub async fn discover_urls(client: &Client, settings: &Settings) -> Vec<String> {
    let quota = settings.per_feed_quota();
    let per_feed: Vec<Vec<String>> = stream::iter(settings.feeds.iter())
        .then(|feed| rss::index_articles(client, feed, quota, &settings.keywords))
        .collect()
        .await;

    let urls: Vec<String> = per_feed
        .into_iter()
        .flatten()
        .unique()
        .take(settings.max_articles)
        .collect();
    info!(count = urls.len(), "Total unique articles found");
    urls
}

/// Run the whole workflow once.
#[instrument(level = "info", skip_all)]
pub async fn run_workflow<S: DigestSender>(
    client: &Client,
    settings: &Settings,
    summarizer: &Summarizer,
    sender: &S,
) -> RunReport {
    let t0 = Instant::now();
    info!("Starting article digest workflow");

    let urls = discover_urls(client, settings).await;
    let mut summaries: Vec<SummaryRecord> = Vec::new();
    let mut processed = 0usize;

    for (i, url) in urls.iter().enumerate() {
        if i > 0 && !settings.delay().is_zero() {
            sleep(settings.delay()).await;
        }
        processed += 1;

        let Some(article) = article::fetch_article(client, url).await else {
            continue;
        };
        match summarizer.summarize(article).await {
            Some(summary) => summaries.push(summary),
            None => warn!(%url, "Failed to summarize article"),
        }
    }

    let delivery = if summaries.is_empty() {
        info!("No summaries to send.");
        Delivery::NotAttempted
    } else if sender.send_digest(&summaries).await {
        info!(count = summaries.len(), "Successfully sent summaries via email");
        Delivery::Sent
    } else {
        warn!("Failed to send email");
        Delivery::Failed
    };

    let report = RunReport {
        discovered: urls.len(),
        processed,
        succeeded: summaries.len(),
        delivery,
    };
    info!(
        discovered = report.discovered,
        processed = report.processed,
        succeeded = report.succeeded,
        delivery = ?report.delivery,
        elapsed_ms = t0.elapsed().as_millis(),
        "Workflow completed"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<Vec<String>>>,
        succeed: bool,
    }

    impl RecordingSender {
        fn succeeding() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                succeed: true,
            }
        }
    }

    impl DigestSender for RecordingSender {
        async fn send_digest(&self, summaries: &[SummaryRecord]) -> bool {
            let titles = summaries.iter().map(|s| s.article.title.clone()).collect();
            self.sent.lock().unwrap().push(titles);
            self.succeed
        }
    }

    fn feed(links: &[String]) -> String {
        let items: String = links
            .iter()
            .map(|l| format!("<item><title>x</title><link>{l}</link></item>"))
            .collect();
        format!("<?xml version=\"1.0\"?><rss><channel>{items}</channel></rss>")
    }

    fn article_page(title: &str) -> String {
        let body = (0..150).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        format!("<html><body><h1>{title}</h1><article>{body}</article></body></html>")
    }

    fn settings(feeds: Vec<String>, max_articles: usize) -> Settings {
        Settings {
            feeds,
            keywords: vec!["tech".to_string()],
            max_articles,
            delay_secs: 0,
        }
    }

    async fn mount(server: &MockServer, at: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_run_workflow_sends_digest() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount(
            &server,
            "/feed.xml",
            feed(&[
                format!("{uri}/tech/one"),
                format!("{uri}/sports/skip"),
                format!("{uri}/tech/short"),
            ]),
        )
        .await;
        mount(&server, "/tech/one", article_page("One")).await;
        mount(
            &server,
            "/tech/short",
            "<html><body><h1>Short</h1><article>too short</article></body></html>".to_string(),
        )
        .await;

        let client = crate::scrapers::http_client().unwrap();
        let settings = settings(vec![format!("{uri}/feed.xml")], 3);
        let summarizer = Summarizer::new(vec![], settings.keywords.clone());
        let sender = RecordingSender::succeeding();

        let report = run_workflow(&client, &settings, &summarizer, &sender).await;
        assert_eq!(
            report,
            RunReport {
                discovered: 2,
                processed: 2,
                succeeded: 1,
                delivery: Delivery::Sent,
            }
        );
        assert_eq!(*sender.sent.lock().unwrap(), vec![vec!["One".to_string()]]);
    }

    #[tokio::test]
    async fn test_run_workflow_no_matches_sends_nothing() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount(&server, "/feed.xml", feed(&[format!("{uri}/sports/a")])).await;

        let client = crate::scrapers::http_client().unwrap();
        let settings = settings(vec![format!("{uri}/feed.xml")], 5);
        let summarizer = Summarizer::new(vec![], settings.keywords.clone());
        let sender = RecordingSender::succeeding();

        let report = run_workflow(&client, &settings, &summarizer, &sender).await;
        assert_eq!(report.discovered, 0);
        assert_eq!(report.delivery, Delivery::NotAttempted);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_workflow_nothing_survives_sends_nothing() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount(
            &server,
            "/feed.xml",
            feed(&[format!("{uri}/tech/short"), format!("{uri}/tech/gone")]),
        )
        .await;
        mount(
            &server,
            "/tech/short",
            "<html><body><h1>Short</h1><article>too short</article></body></html>".to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/tech/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = crate::scrapers::http_client().unwrap();
        let settings = settings(vec![format!("{uri}/feed.xml")], 2);
        let summarizer = Summarizer::new(vec![], settings.keywords.clone());
        let sender = RecordingSender::succeeding();

        let report = run_workflow(&client, &settings, &summarizer, &sender).await;
        assert_eq!(
            report,
            RunReport {
                discovered: 2,
                processed: 2,
                succeeded: 0,
                delivery: Delivery::NotAttempted,
            }
        );
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_workflow_reports_failed_delivery() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount(&server, "/feed.xml", feed(&[format!("{uri}/tech/one")])).await;
        mount(&server, "/tech/one", article_page("One")).await;

        let client = crate::scrapers::http_client().unwrap();
        let settings = settings(vec![format!("{uri}/feed.xml")], 1);
        let summarizer = Summarizer::new(vec![], settings.keywords.clone());
        let sender = RecordingSender::default();

        let report = run_workflow(&client, &settings, &summarizer, &sender).await;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.delivery, Delivery::Failed);
    }

    #[tokio::test]
    async fn test_discover_urls_dedupes_and_caps() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let shared = format!("{uri}/tech/shared");
        mount(
            &server,
            "/a.xml",
            feed(&[shared.clone(), format!("{uri}/tech/a1"), format!("{uri}/tech/a2")]),
        )
        .await;
        mount(
            &server,
            "/b.xml",
            feed(&[shared.clone(), format!("{uri}/tech/b1"), format!("{uri}/tech/b2")]),
        )
        .await;

        let client = crate::scrapers::http_client().unwrap();
        // quota per feed = 6 / 2 = 3
        let s = settings(vec![format!("{uri}/a.xml"), format!("{uri}/b.xml")], 6);
        let urls = discover_urls(&client, &s).await;
        assert_eq!(
            urls,
            vec![
                shared.clone(),
                format!("{uri}/tech/a1"),
                format!("{uri}/tech/a2"),
                format!("{uri}/tech/b1"),
                format!("{uri}/tech/b2"),
            ]
        );

        // quota per feed = 5 / 2 = 2, then capped at 5
        let s = settings(vec![format!("{uri}/a.xml"), format!("{uri}/b.xml")], 5);
        let urls = discover_urls(&client, &s).await;
        assert_eq!(
            urls,
            vec![shared, format!("{uri}/tech/a1"), format!("{uri}/tech/b1")]
        );
    }

    #[tokio::test]
    async fn test_discover_urls_dead_feed_is_skipped() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount(&server, "/ok.xml", feed(&[format!("{uri}/tech/ok")])).await;

        let client = crate::scrapers::http_client().unwrap();
        let s = settings(vec![format!("{uri}/missing.xml"), format!("{uri}/ok.xml")], 2);
        let urls = discover_urls(&client, &s).await;
        assert_eq!(urls, vec![format!("{uri}/tech/ok")]);
    }
}
