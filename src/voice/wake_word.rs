//! Wake word detection in transcripts
//!
//! Looks for an explicit trigger phrase ("hey convoscope") in transcribed
//! speech and extracts the command that follows it. Phrases are checked in
//! their declared order; the first phrase that matches anywhere wins, even
//! if another phrase occurs earlier in the text.

use std::sync::LazyLock;

/// Default trigger phrases, including common mis-transcriptions
pub const EXPLICIT_WAKE_WORDS: &[&str] = &[
    "hey convoscope",
    "hey conboscope",
    "hey confoscope",
    "hey condoscope",
    "hey comvoscope",
    "hey comboscope",
    "hey comfoscope",
    "hey comdoscope",
    "hey convo scope",
];

static DEFAULT_DETECTOR: LazyLock<WakeWordDetector> = LazyLock::new(WakeWordDetector::default);

/// A wake word found in a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeWordMatch {
    /// The trigger phrase that matched
    pub phrase: String,
    /// Byte offset of the text following the phrase in the lowercased transcript
    pub offset: usize,
    /// Lowercased text following the phrase
    pub query: String,
}

/// Detects trigger phrases in transcripts
#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    wake_words: Vec<String>,
}

impl Default for WakeWordDetector {
    fn default() -> Self {
        Self::new(EXPLICIT_WAKE_WORDS.iter().copied())
    }
}

impl WakeWordDetector {
    /// Create a detector; phrases are lowercased and trimmed, order is kept
    #[must_use]
    pub fn new<I, S>(wake_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = wake_words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        tracing::debug!(wake_words = ?normalized, "wake word detector initialized");

        Self {
            wake_words: normalized,
        }
    }

    /// Process-wide detector over [`EXPLICIT_WAKE_WORDS`], built on first use
    #[must_use]
    pub fn shared() -> &'static Self {
        &DEFAULT_DETECTOR
    }

    /// Get the configured wake words
    #[must_use]
    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }

    /// Check if a transcript contains any wake word (case-insensitive)
    #[must_use]
    pub fn contains_wake_word(&self, transcript: &str) -> bool {
        let normalized = transcript.to_lowercase();
        self.wake_words.iter().any(|w| normalized.contains(w.as_str()))
    }

    /// Find the first configured phrase present and the text after it
    #[must_use]
    pub fn explicit_query(&self, transcript: &str) -> Option<WakeWordMatch> {
        let normalized = transcript.to_lowercase();

        self.wake_words.iter().find_map(|wake_word| {
            let start = normalized.find(wake_word.as_str())?;
            let offset = start + wake_word.len();
            tracing::info!(wake_word, transcript, "wake word detected");
            Some(WakeWordMatch {
                phrase: wake_word.clone(),
                offset,
                query: normalized[offset..].to_string(),
            })
        })
    }
}

/// Check a transcript against the default wake words
#[must_use]
pub fn does_text_contain_wake_word(transcript: &str) -> bool {
    WakeWordDetector::shared().contains_wake_word(transcript)
}

/// Text after the first default wake word, lowercased
#[must_use]
pub fn get_explicit_query_from_transcript(transcript: &str) -> Option<String> {
    WakeWordDetector::shared()
        .explicit_query(transcript)
        .map(|m| m.query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_query() {
        assert_eq!(
            get_explicit_query_from_transcript("hey convoscope what is this").as_deref(),
            Some(" what is this")
        );
        assert_eq!(get_explicit_query_from_transcript("no trigger here"), None);
    }

    #[test]
    fn test_shared_detector_is_built_once() {
        let first = WakeWordDetector::shared();
        assert!(std::ptr::eq(first, WakeWordDetector::shared()));
        assert_eq!(first.wake_words(), EXPLICIT_WAKE_WORDS);
    }

    #[test]
    fn test_query_is_lowercased() {
        assert_eq!(
            get_explicit_query_from_transcript("Hey Convo Scope, Find COFFEE").as_deref(),
            Some(", find coffee")
        );
    }

    #[test]
    fn test_declared_order_wins_over_position() {
        let detector = WakeWordDetector::new(["orin", "hey"]);
        let found = detector.explicit_query("hey there orin go").unwrap();
        assert_eq!(found.phrase, "orin");
        assert_eq!(found.offset, 14);
        assert_eq!(found.query, " go");
    }

    #[test]
    fn test_contains_wake_word() {
        assert!(does_text_contain_wake_word("HEY CONBOSCOPE"));
        assert!(does_text_contain_wake_word("okay hey comboscope tell me"));
        assert!(!does_text_contain_wake_word("hello world"));
        assert!(!does_text_contain_wake_word(""));
    }

    #[test]
    fn test_normalization() {
        let detector = WakeWordDetector::new(["  Hey ORIN  ", "", "HELLO"]);
        assert_eq!(detector.wake_words(), &["hey orin", "hello"]);
    }
}
