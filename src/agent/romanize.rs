//! Chinese to tone-marked pinyin

use pinyin::ToPinyin;

/// Target language that triggers romanization of agent replies
pub const CHINESE_PINYIN: &str = "Chinese (Pinyin)";

/// Whether replies in `target_language` should be romanized
#[must_use]
pub fn needs_pinyin(target_language: &str) -> bool {
    target_language == CHINESE_PINYIN
}

/// Convert Chinese text to space-separated tone-marked pinyin
///
/// Every Han character becomes one syllable; runs of other characters
/// (latin words, punctuation) are kept as a single segment.
#[must_use]
pub fn to_pinyin(text: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut run = String::new();

    for ch in text.chars() {
        if let Some(syllable) = ch.to_pinyin() {
            if !run.is_empty() {
                segments.push(std::mem::take(&mut run));
            }
            segments.push(syllable.with_tone().to_string());
        } else {
            run.push(ch);
        }
    }

    if !run.is_empty() {
        segments.push(run);
    }

    segments.join(" ")
}
