//! Conversation agent integration tests

use std::sync::Arc;

use convoscope_agents::{
    ConversationTurn, ConvoAgent, ConvoOutcome, ConvoRequest, Error, TtsRequest,
};

mod common;
use common::StubLlm;

fn request(language: &str) -> ConvoRequest {
    ConvoRequest {
        places: vec!["Starbucks Coffee".to_string(), "Central Park".to_string()],
        target_language: language.to_string(),
        fluency_level: 42,
        conversation_history: vec![
            ConversationTurn::new("agent", "Привет!"),
            ConversationTurn::new("user", "Привет"),
        ],
    }
}

#[tokio::test]
async fn test_reply_and_tts_payload() {
    let llm = Arc::new(StubLlm::replying(
        r#"{"response": "Что вы пьёте в Starbucks?"}"#,
    ));
    let agent = ConvoAgent::new(Arc::clone(&llm));

    let outcome = agent.respond(&request("Russian")).await.unwrap();
    let reply = outcome.into_reply().expect("parsed reply");

    assert_eq!(reply.response, "Что вы пьёте в Starbucks?");
    assert_eq!(
        reply.to_tts,
        TtsRequest {
            text: "Что вы пьёте в Starbucks?".to_string(),
            language: "Russian".to_string(),
        }
    );
}

#[tokio::test]
async fn test_prompt_contents_and_temperature() {
    let llm = Arc::new(StubLlm::replying(r#"{"response": "ok"}"#));
    let agent = ConvoAgent::new(Arc::clone(&llm));

    agent.respond(&request("French")).await.unwrap();

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    let (prompt, temperature) = &calls[0];
    assert!((temperature - 0.3).abs() < f32::EPSILON);
    assert!(prompt.contains("Target Language: French"));
    assert!(prompt.contains("Fluency Level: 42"));
    assert!(prompt.contains("Nearby Points of Interest:\nStarbucks Coffee\nCentral Park\n"));
    assert!(prompt.contains("agent: Привет!\nuser: Привет\n"));
    assert!(prompt.contains("Now provide the (very short) output in French"));
    assert!(prompt.contains(r#""required":["response"]"#));
}

#[tokio::test]
async fn test_schema_mismatch_is_parse_failure() {
    let llm = StubLlm::replying("Bonjour! Comment ça va?");
    let agent = ConvoAgent::new(llm);

    let outcome = agent.respond(&request("French")).await.unwrap();
    match outcome {
        ConvoOutcome::ParseFailure(e) => assert_eq!(e.raw, "Bonjour! Comment ça va?"),
        ConvoOutcome::Reply(reply) => panic!("unexpected reply: {reply:?}"),
    }
}

#[tokio::test]
async fn test_llm_error_propagates() {
    let agent = ConvoAgent::new(StubLlm::failing("rate limited"));
    let result = agent.respond(&request("Russian")).await;
    assert!(matches!(result, Err(Error::Llm(_))));
}

#[tokio::test]
async fn test_pinyin_romanization() {
    let llm = StubLlm::replying("```json\n{\"response\": \"你喜欢博物馆吗\"}\n```");
    let agent = ConvoAgent::new(llm);

    let reply = agent
        .respond(&request("Chinese (Pinyin)"))
        .await
        .unwrap()
        .into_reply()
        .expect("parsed reply");

    let syllables: Vec<&str> = reply.response.split(' ').collect();
    assert_eq!(syllables.len(), "你喜欢博物馆吗".chars().count());
    assert_eq!(syllables[0], "nǐ");
    assert!(reply.response.chars().all(|c| !('\u{4e00}'..='\u{9fff}').contains(&c)));
    assert_eq!(reply.to_tts.text, reply.response);
    assert_eq!(reply.to_tts.language, "Chinese (Pinyin)");
}

#[tokio::test]
async fn test_plain_chinese_is_not_romanized() {
    let agent = ConvoAgent::new(StubLlm::replying(r#"{"response": "你好"}"#));
    let reply = agent
        .respond(&request("Chinese"))
        .await
        .unwrap()
        .into_reply()
        .expect("parsed reply");
    assert_eq!(reply.response, "你好");
}

#[tokio::test]
async fn test_custom_temperature() {
    let llm = Arc::new(StubLlm::replying(r#"{"response": "ok"}"#));
    let agent = ConvoAgent::new(Arc::clone(&llm)).with_temperature(0.7);
    agent.respond(&ConvoRequest::default()).await.unwrap();
    assert!((llm.calls()[0].1 - 0.7).abs() < f32::EPSILON);
}
