//! Extractive page summarization

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^.!?。！？]+[.!?。！？]*").expect("valid regex")
});

static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "more", "most", "no", "not",
    "of", "on", "or", "other", "our", "she", "so", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "to", "was", "we", "were", "what", "when",
    "which", "who", "will", "with", "would", "you", "your",
];

/// Reduces page text to a fixed number of sentences
pub trait Summarizer: Send + Sync {
    /// Summarize `text` to at most `num_sentences` sentences
    ///
    /// Returns an empty string when nothing worth keeping was found.
    fn summarize(&self, text: &str, num_sentences: usize) -> String;
}

/// Word-frequency extractive summarizer
///
/// Scores each sentence by the mean normalized frequency of its non-stopword
/// words and keeps the best ones in their original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencySummarizer;

impl FrequencySummarizer {
    fn content_words(sentence: &str) -> Vec<String> {
        WORD_REGEX
            .find_iter(sentence)
            .map(|m| m.as_str().to_lowercase())
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
            .collect()
    }
}

impl Summarizer for FrequencySummarizer {
    #[allow(clippy::cast_precision_loss)]
    fn summarize(&self, text: &str, num_sentences: usize) -> String {
        let sentences: Vec<&str> = SENTENCE_REGEX
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .collect();

        if num_sentences == 0 || sentences.is_empty() {
            return String::new();
        }

        if sentences.len() <= num_sentences {
            return sentences.join(" ");
        }

        let words: Vec<Vec<String>> = sentences.iter().map(|s| Self::content_words(s)).collect();

        let mut frequencies: HashMap<&str, usize> = HashMap::new();
        for word in words.iter().flatten() {
            *frequencies.entry(word.as_str()).or_default() += 1;
        }
        let max_frequency = frequencies.values().copied().max().unwrap_or(1) as f64;

        let mut scored: Vec<(usize, f64)> = words
            .iter()
            .enumerate()
            .map(|(idx, sentence_words)| {
                if sentence_words.is_empty() {
                    return (idx, 0.0);
                }
                let total: f64 = sentence_words
                    .iter()
                    .map(|w| {
                        frequencies.get(w.as_str()).copied().unwrap_or(0) as f64 / max_frequency
                    })
                    .sum();
                (idx, total / sentence_words.len() as f64)
            })
            .collect();

        // Highest score first; earlier sentence wins ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut keep: Vec<usize> = scored
            .into_iter()
            .take(num_sentences)
            .map(|(idx, _)| idx)
            .collect();
        keep.sort_unstable();

        keep.into_iter()
            .map(|idx| sentences[idx])
            .collect::<Vec<_>>()
            .join(" ")
    }
}
