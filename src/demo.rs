//! Sample digest for previewing the email layout without credentials.

use crate::models::{ArticleRecord, SummaryRecord, SummaryStrategy};
use crate::outputs::html::render_digest;
use crate::utils::ensure_writable_dir;
use chrono::Local;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn sample(
    title: &str,
    author: &str,
    date: &str,
    url: &str,
    summary: &str,
    insights: &[&str],
    topics: &[&str],
    takeaways: &[&str],
    relevance_score: u8,
) -> SummaryRecord {
    SummaryRecord {
        article: ArticleRecord {
            url: url.to_string(),
            title: title.to_string(),
            content: summary.to_string(),
            author: Some(author.to_string()),
            date: Some(date.to_string()),
            scraped_at: Local::now(),
        },
        summary: summary.to_string(),
        insights: strings(insights),
        topics: strings(topics),
        takeaways: strings(takeaways),
        relevance_score,
        strategy: SummaryStrategy::RuleBased,
        summarized_at: Local::now(),
    }
}

/// Three hand-written summaries covering the digest's fields.
pub fn sample_summaries() -> Vec<SummaryRecord> {
    vec![
        sample(
            "SpaceX reveals why the last two Starships failed as another launch draws near",
            "Eric Berger",
            "August 15, 2025",
            "https://arstechnica.com/space/2025/08/spacex-reveals-why-the-last-two-starships-failed-as-another-launch-draws-near/",
            "SpaceX has announced the launch is scheduled for no earlier than next Sunday, August 24. Engineers conducted extensive analysis of the previous failures and implemented key improvements to the rocket design.",
            &[
                "SpaceX identified specific technical issues in previous launches",
                "New safety measures have been implemented",
                "Launch window opens August 24",
            ],
            &["Spacex", "Starship", "Launch", "Rocket", "Space"],
            &[
                "Monitor the upcoming launch for success indicators",
                "Consider implications for space industry",
                "Follow SpaceX's technical improvements",
            ],
            9,
        ),
        sample(
            "Winklevoss twins' crypto company Gemini files for IPO",
            "Kirsten Korosec",
            "August 15, 2025",
            "https://techcrunch.com/2025/08/15/winklevoss-twins-crypto-company-gemini-files-for-ipo/",
            "Gemini Space Station Inc. plans to list on the Nasdaq Global Select Market under the symbol GEMI. The company aims to raise significant capital through this public offering.",
            &[
                "Another crypto company heading to public markets",
                "Gemini plans Nasdaq listing under GEMI symbol",
                "Significant capital raise expected",
            ],
            &["Crypto", "Gemini", "Ipo", "Nasdaq", "Finance"],
            &[
                "Watch for crypto market impact",
                "Consider investment opportunities",
                "Monitor regulatory developments",
            ],
            8,
        ),
        sample(
            "Top 10 AI Tools That Will Transform Your Content Creation in 2025",
            "Adil Ahmad",
            "January 2, 2025",
            "https://techncruncher.blogspot.com/2025/01/top-10-ai-tools-that-will-transform.html",
            "The digital landscape has evolved dramatically, and AI tools have become essential for creators. This comprehensive guide covers the most innovative AI solutions for content creation.",
            &[
                "AI tools are revolutionizing content creation",
                "10 key tools identified for 2025",
                "Significant productivity improvements possible",
            ],
            &["Tools", "Content", "Creation", "Digital", "Technology"],
            &[
                "Evaluate AI tools for your workflow",
                "Invest in productivity improvements",
                "Stay updated on AI trends",
            ],
            10,
        ),
    ]
}

/// Render the sample digest and write it to `output`.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub async fn write_demo(output: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_writable_dir(parent).await?;
    }
    let summaries = sample_summaries();
    let html = render_digest(&summaries, Local::now());
    fs::write(output, html).await?;
    info!(articles = summaries.len(), "Wrote demo digest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_summaries_are_well_formed() {
        let summaries = sample_summaries();
        assert_eq!(summaries.len(), 3);
        for s in &summaries {
            assert!((5..=10).contains(&s.relevance_score));
            assert_eq!(s.topics.len(), 5);
            assert_eq!(s.insights.len(), 3);
            assert_eq!(s.takeaways.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_write_demo_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("preview/demo_email.html");
        write_demo(&output).await.unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("Found 3 relevant articles"));
        assert!(html.contains("Winklevoss twins&#39; crypto company Gemini files for IPO"));
        assert!(html.contains("<span class=\"score\">10/10</span>"));
    }
}
