//! Wake word integration tests

use convoscope_agents::voice::EXPLICIT_WAKE_WORDS;
use convoscope_agents::{
    WakeWordDetector, does_text_contain_wake_word, get_explicit_query_from_transcript,
};

#[test]
fn test_every_default_phrase_is_detected() {
    for phrase in EXPLICIT_WAKE_WORDS {
        let transcript = format!("um {} what is that building", phrase.to_uppercase());
        assert!(does_text_contain_wake_word(&transcript), "{phrase} not detected");
        assert_eq!(
            get_explicit_query_from_transcript(&transcript).as_deref(),
            Some(" what is that building")
        );
    }
}

#[test]
fn test_contains_matches_substring_rule() {
    let detector = WakeWordDetector::new(["hey orin", "computer"]);
    let cases = [
        ("Hey Orin, lights on", true),
        ("my COMPUTER is slow", true),
        ("heyorin", false),
        ("hey or in", false),
        ("", false),
    ];

    for (transcript, expected) in cases {
        let by_rule = detector
            .wake_words()
            .iter()
            .any(|w| transcript.to_lowercase().contains(w.as_str()));
        assert_eq!(detector.contains_wake_word(transcript), expected, "{transcript}");
        assert_eq!(by_rule, expected, "{transcript}");
    }
}

#[test]
fn test_explicit_query_examples() {
    assert_eq!(
        get_explicit_query_from_transcript("hey convoscope what is this").as_deref(),
        Some(" what is this")
    );
    assert_eq!(get_explicit_query_from_transcript("no trigger here"), None);
    assert_eq!(
        get_explicit_query_from_transcript("hey convoscope").as_deref(),
        Some("")
    );
}

#[test]
fn test_first_occurrence_of_phrase_is_used() {
    let detector = WakeWordDetector::new(["hey orin"]);
    let found = detector
        .explicit_query("hey orin stop. hey orin play music")
        .expect("wake word present");
    assert_eq!(found.offset, "hey orin".len());
    assert_eq!(found.query, " stop. hey orin play music");
}

#[test]
fn test_phrase_order_over_text_position() {
    // "hey convo scope" is declared after "hey convoscope"
    let transcript = "hey convo scope one, hey convoscope two";
    assert_eq!(
        get_explicit_query_from_transcript(transcript).as_deref(),
        Some(" two")
    );
}
