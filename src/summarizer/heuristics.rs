//! Deterministic text heuristics.
//!
//! Sentences are whatever lies between `". "` separators; nothing smarter is
//! attempted. Every function here is pure and works on the full article text.

use crate::models::MAX_RELEVANCE_SCORE;
use crate::utils::{title_case, truncate_chars};
use std::collections::{HashMap, HashSet};

/// Words that mark a sentence as an insight.
pub const SIGNIFICANCE_KEYWORDS: &[&str] = &[
    "important",
    "key",
    "significant",
    "major",
    "breakthrough",
    "innovation",
    "discovery",
    "finding",
    "result",
    "conclusion",
];

/// Words that mark a sentence as a takeaway.
pub const ACTION_WORDS: &[&str] = &[
    "should",
    "must",
    "need",
    "will",
    "can",
    "could",
    "would",
    "recommend",
    "suggest",
];

/// Words never reported as topics.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Used when no sentence contains an action word.
pub const GENERIC_TAKEAWAYS: [&str; 3] = [
    "Review the content for key insights",
    "Consider the implications for your field",
    "Share relevant findings with your team",
];

pub const SENTENCE_SEPARATOR: &str = ". ";

const SHORT_SUMMARY_CHARS: usize = 500;
const INSIGHT_SCAN_SENTENCES: usize = 10;
const MAX_INSIGHTS: usize = 3;
const MAX_TAKEAWAYS: usize = 3;
const MAX_TOPICS: usize = 5;
const MIN_TOPIC_CHARS: usize = 4;

const BASE_RELEVANCE: u8 = 5;
const LONG_ARTICLE_WORDS: usize = 1000;
const VERY_LONG_ARTICLE_WORDS: usize = 2000;

pub fn split_sentences(content: &str) -> Vec<&str> {
    content.split(SENTENCE_SEPARATOR).collect()
}

fn mentions_any(sentence: &str, words: &[&str]) -> bool {
    let lowered = sentence.to_lowercase();
    words.iter().any(|w| lowered.contains(w))
}

/// Extractive summary: first, middle and last sentence when there are more
/// than three, otherwise the first 500 characters.
pub fn rule_based_summary(content: &str) -> String {
    let sentences = split_sentences(content);
    if sentences.len() > 3 {
        [
            sentences[0],
            sentences[sentences.len() / 2],
            sentences[sentences.len() - 1],
        ]
        .join(SENTENCE_SEPARATOR)
    } else if content.chars().count() > SHORT_SUMMARY_CHARS {
        format!("{}...", truncate_chars(content, SHORT_SUMMARY_CHARS))
    } else {
        content.to_string()
    }
}

/// Up to three of the first ten sentences that mention a significance
/// keyword, or the first three sentences when none do.
pub fn key_insights(content: &str) -> Vec<String> {
    let sentences = split_sentences(content);
    let insights: Vec<String> = sentences
        .iter()
        .take(INSIGHT_SCAN_SENTENCES)
        .filter(|s| mentions_any(s, SIGNIFICANCE_KEYWORDS))
        .take(MAX_INSIGHTS)
        .map(|s| s.trim().to_string())
        .collect();

    if insights.is_empty() {
        sentences
            .iter()
            .take(MAX_INSIGHTS)
            .map(|s| s.trim().to_string())
            .collect()
    } else {
        insights
    }
}

/// The five most frequent words longer than three characters that are not
/// stop words, title-cased. Ties keep first-occurrence order.
pub fn extract_topics(content: &str) -> Vec<String> {
    let lowered = content.to_lowercase();
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for word in lowered.split_whitespace() {
        if word.chars().count() < MIN_TOPIC_CHARS || stop.contains(word) {
            continue;
        }
        match position.get(word) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                position.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    // stable sort, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(MAX_TOPICS)
        .map(|(word, _)| title_case(word))
        .collect()
}

/// Up to three sentences that mention an action word, or generic advice.
pub fn extract_takeaways(content: &str) -> Vec<String> {
    let takeaways: Vec<String> = split_sentences(content)
        .into_iter()
        .filter(|s| mentions_any(s, ACTION_WORDS))
        .take(MAX_TAKEAWAYS)
        .map(|s| s.trim().to_string())
        .collect();

    if takeaways.is_empty() {
        GENERIC_TAKEAWAYS.iter().map(|s| s.to_string()).collect()
    } else {
        takeaways
    }
}

/// Score in `5..=10`: one point per keyword found in the text, one for more
/// than 1000 words and another for more than 2000.
pub fn relevance_score(content: &str, keywords: &[String]) -> u8 {
    let lowered = content.to_lowercase();
    let hits = keywords
        .iter()
        .filter(|k| lowered.contains(k.to_lowercase().as_str()))
        .count();

    let words = content.split_whitespace().count();
    let length_bonus = usize::from(words > LONG_ARTICLE_WORDS) + usize::from(words > VERY_LONG_ARTICLE_WORDS);

    let score = usize::from(BASE_RELEVANCE) + hits + length_bonus;
    score.min(usize::from(MAX_RELEVANCE_SCORE)) as u8
}
