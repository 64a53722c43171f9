//! Keyword and lexicon based text analysis

use std::collections::HashMap;

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use super::{TextAnalysis, TextAnalyzer};

/// Terms that count towards `keyword_count`
const KEYWORD_TERMS: &[&str] = &["fake", "staged", "ghost", "exaggerated", "quick cash"];

const POSITIVE_WORDS: &[&str] = &[
    "good", "fine", "great", "thanks", "thank", "helpful", "minor", "recovered", "resolved",
    "happy", "careful", "safe", "routine", "clear",
];

const NEGATIVE_WORDS: &[&str] = &[
    "pain", "terrible", "awful", "severe", "urgent", "angry", "hurt", "injury", "damage",
    "destroyed", "unbearable", "lost", "stolen", "worst", "immediately", "desperate",
];

/// Prior notes shorter than this are not compared
const MIN_COMPARABLE_CHARS: usize = 10;

/// In-process text analyzer
///
/// Counts suspicious keyword occurrences, scores sentiment against a small
/// lexicon and measures bag-of-words cosine similarity against prior notes.
#[derive(Debug, Clone, Default)]
pub struct KeywordTextAnalyzer;

impl KeywordTextAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl DomainPort for KeywordTextAnalyzer {}

#[async_trait]
impl TextAnalyzer for KeywordTextAnalyzer {
    async fn analyze(&self, text: &str, prior_notes: &[String]) -> Result<TextAnalysis, PortError> {
        let tokens = tokenize(text);
        let (keyword_count, suspicious_phrases) = match_keywords(&tokens);

        let max_similarity = prior_notes
            .iter()
            .filter(|note| note.chars().count() > MIN_COMPARABLE_CHARS)
            .map(|note| cosine_similarity(&tokens, &tokenize(note)))
            .fold(0.0_f64, f64::max);

        Ok(TextAnalysis {
            keyword_count,
            suspicious_phrases,
            sentiment: sentiment(&tokens),
            max_similarity,
        })
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Counts every occurrence of each keyword term, multi-word terms included
fn match_keywords(tokens: &[String]) -> (u32, Vec<String>) {
    let mut count = 0;
    let mut first_seen: Vec<(usize, String)> = Vec::new();

    for term in KEYWORD_TERMS {
        let parts: Vec<&str> = term.split(' ').collect();
        let hits: Vec<usize> = tokens
            .windows(parts.len())
            .enumerate()
            .filter(|(_, window)| window.iter().zip(&parts).all(|(t, p)| t == p))
            .map(|(i, _)| i)
            .collect();

        if let Some(&first) = hits.first() {
            count += hits.len() as u32;
            first_seen.push((first, term.to_string()));
        }
    }

    first_seen.sort_by_key(|(pos, _)| *pos);
    (count, first_seen.into_iter().map(|(_, term)| term).collect())
}

fn sentiment(tokens: &[String]) -> f64 {
    let positive = tokens.iter().filter(|t| POSITIVE_WORDS.contains(&t.as_str())).count() as f64;
    let negative = tokens.iter().filter(|t| NEGATIVE_WORDS.contains(&t.as_str())).count() as f64;
    if positive + negative == 0.0 {
        return 0.0;
    }
    (positive - negative) / (positive + negative)
}

fn cosine_similarity(a: &[String], b: &[String]) -> f64 {
    fn freq(tokens: &[String]) -> HashMap<&str, f64> {
        let mut map: HashMap<&str, f64> = HashMap::new();
        for t in tokens {
            *map.entry(t.as_str()).or_default() += 1.0;
        }
        map
    }
    let fa = freq(a);
    let fb = freq(b);

    let dot: f64 = fa.iter().filter_map(|(k, v)| fb.get(k).map(|w| v * w)).sum();
    let norm = |m: &HashMap<&str, f64>| m.values().map(|v| v * v).sum::<f64>().sqrt();
    let denom = norm(&fa) * norm(&fb);
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keywords_counted_in_order() {
        let analysis = KeywordTextAnalyzer::new()
            .analyze("Staged crash, need quick cash. Totally staged.", &[])
            .await
            .unwrap();

        assert_eq!(analysis.keyword_count, 3);
        assert_eq!(analysis.suspicious_phrases, vec!["staged", "quick cash"]);
    }

    #[tokio::test]
    async fn test_clean_notes_have_no_keywords() {
        let analysis = KeywordTextAnalyzer::new()
            .analyze("Routine checkup at the clinic", &[])
            .await
            .unwrap();

        assert_eq!(analysis.keyword_count, 0);
        assert!(analysis.suspicious_phrases.is_empty());
        assert!(analysis.sentiment > 0.0);
    }

    #[tokio::test]
    async fn test_identical_prior_note_is_fully_similar() {
        let notes = "Rear ended at the intersection, neck pain".to_string();
        let analysis = KeywordTextAnalyzer::new()
            .analyze(&notes, &[notes.clone(), "short".to_string()])
            .await
            .unwrap();

        assert!((analysis.max_similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_prior_notes_ignored_by_cosine_inputs() {
        assert_eq!(cosine_similarity(&tokenize("abc"), &[]), 0.0);
    }

    #[test]
    fn test_sentiment_range() {
        assert_eq!(sentiment(&tokenize("terrible severe pain")), -1.0);
        assert_eq!(sentiment(&tokenize("nothing here")), 0.0);
    }
}
