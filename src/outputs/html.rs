//! HTML digest rendering.
//!
//! The digest is one self-contained document with an embedded stylesheet so
//! it renders the same in mail clients and in a browser.

use crate::models::{SummaryRecord, SummaryStrategy};
use crate::utils::escape_html;
use chrono::{DateTime, Local, NaiveDate};
use std::fmt::Write;

const STYLESHEET: &str = r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; }
        .header { background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 20px; text-align: center; }
        .article { border: 1px solid #ddd; border-radius: 8px; padding: 20px; margin-bottom: 20px; background-color: #fff; }
        .title { color: #2c3e50; font-size: 18px; font-weight: bold; margin-bottom: 10px; }
        .meta { color: #7f8c8d; font-size: 14px; margin-bottom: 15px; }
        .summary { background-color: #f8f9fa; padding: 15px; border-radius: 5px; margin-bottom: 15px; border-left: 4px solid #3498db; }
        .insights { margin-bottom: 15px; }
        .topics { color: #3498db; font-weight: bold; }
        .score { color: #e74c3c; font-weight: bold; }
        .url { color: #3498db; text-decoration: none; }
        .url:hover { text-decoration: underline; }
        .footer { text-align: center; margin-top: 30px; color: #7f8c8d; font-size: 12px; }
"#;

/// Subject line for a digest sent on `date`.
pub fn subject_line(date: NaiveDate) -> String {
    format!("📰 Article Summaries - {}", date.format("%Y-%m-%d"))
}

/// Render `summaries` into the digest document.
pub fn render_digest(summaries: &[SummaryRecord], generated_at: DateTime<Local>) -> String {
    let mut html = String::new();

    writeln!(html, "<html>\n<head>\n    <meta charset=\"utf-8\">").unwrap();
    writeln!(html, "    <style>{STYLESHEET}    </style>\n</head>\n<body>").unwrap();
    writeln!(
        html,
        "    <div class=\"header\">\n        <h1>📰 Daily Article Summaries</h1>\n        <p>Generated on {}</p>\n        <p>Found {} relevant articles from tech RSS feeds</p>\n    </div>",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        summaries.len()
    )
    .unwrap();

    for (i, record) in summaries.iter().enumerate() {
        render_article(&mut html, i + 1, record);
    }

    writeln!(
        html,
        "    <div class=\"footer\">\n        <p>{}</p>\n    </div>\n</body>\n</html>",
        strategy_tally(summaries)
    )
    .unwrap();

    html
}

fn render_article(html: &mut String, index: usize, record: &SummaryRecord) {
    let article = &record.article;
    let unknown = "Unknown";

    writeln!(html, "    <div class=\"article\">").unwrap();
    writeln!(
        html,
        "        <div class=\"title\">{}. {}</div>",
        index,
        escape_html(&article.title)
    )
    .unwrap();
    writeln!(
        html,
        "        <div class=\"meta\">\n            <strong>Author:</strong> {} |\n            <strong>Date:</strong> {} |\n            <strong>Relevance Score:</strong> <span class=\"score\">{}/10</span>\n        </div>",
        escape_html(article.author.as_deref().unwrap_or(unknown)),
        escape_html(article.date.as_deref().unwrap_or(unknown)),
        record.relevance_score
    )
    .unwrap();
    writeln!(
        html,
        "        <div class=\"summary\">\n            <strong>Summary:</strong><br>\n            {}\n        </div>",
        escape_html(&record.summary)
    )
    .unwrap();
    writeln!(
        html,
        "        <div class=\"insights\">\n            <strong>Key Insights:</strong><br>\n{}        </div>",
        bullet_lines(&record.insights)
    )
    .unwrap();
    writeln!(
        html,
        "        <div class=\"insights\">\n            <strong>Main Topics:</strong> <span class=\"topics\">{}</span>\n        </div>",
        escape_html(&record.topics_line())
    )
    .unwrap();
    writeln!(
        html,
        "        <div class=\"insights\">\n            <strong>Actionable Takeaways:</strong><br>\n{}        </div>",
        bullet_lines(&record.takeaways)
    )
    .unwrap();
    writeln!(
        html,
        "        <div class=\"meta\">\n            <a href=\"{}\" class=\"url\" target=\"_blank\">📖 Read Full Article</a>\n        </div>\n    </div>",
        escape_html(&article.url)
    )
    .unwrap();
}

fn bullet_lines(items: &[String]) -> String {
    let mut out = String::new();
    for item in items {
        writeln!(out, "            • {}<br>", escape_html(item)).unwrap();
    }
    out
}

fn strategy_tally(summaries: &[SummaryRecord]) -> String {
    let count = |s: SummaryStrategy| summaries.iter().filter(|r| r.strategy == s).count();
    format!(
        "Summaries: {} hosted, {} local, {} rule-based",
        count(SummaryStrategy::Remote),
        count(SummaryStrategy::Local),
        count(SummaryStrategy::RuleBased)
    )
}
