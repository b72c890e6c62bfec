//! Voice command handling
//!
//! Transcripts arrive already transcribed; this module only decides whether
//! they address the assistant.

mod wake_word;

pub use wake_word::{
    EXPLICIT_WAKE_WORDS, WakeWordDetector, WakeWordMatch, does_text_contain_wake_word,
    get_explicit_query_from_transcript,
};
