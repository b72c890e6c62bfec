//! Contextual conversation agent for language learners
//!
//! Builds a prompt from nearby points of interest, the learner's target
//! language and fluency, and the conversation so far; asks the LLM for the
//! next short line; parses it against a one-field schema. A reply that does
//! not match the schema is reported as [`ConvoOutcome::ParseFailure`] and
//! never retried.

use std::fmt::Write as _;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::parser::{OutputParser, OutputSchema, ParseError};
use super::romanize::{needs_pinyin, to_pinyin};
use crate::Result;
use crate::llm::LlmClient;

/// Sampling temperature for conversation turns
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// One line of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Speaker, e.g. `user` or `agent`
    pub role: String,
    pub text: String,
}

impl ConversationTurn {
    #[must_use]
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// Inputs for one conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvoRequest {
    /// Nearby points of interest (display labels)
    pub places: Vec<String>,
    pub target_language: String,
    /// Learner proficiency, higher is more fluent
    pub fluency_level: u32,
    pub conversation_history: Vec<ConversationTurn>,
}

impl Default for ConvoRequest {
    fn default() -> Self {
        Self {
            places: Vec::new(),
            target_language: "Russian".to_string(),
            fluency_level: 35,
            conversation_history: Vec::new(),
        }
    }
}

/// Schema the LLM must answer with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConvoResponse {
    /// The next (short, 5-10 words) response to the user
    pub response: String,
}

impl OutputSchema for ConvoResponse {
    fn schema() -> serde_json::Value {
        serde_json::json!({
            "description": "Second language learning contextual conversations agent",
            "properties": {
                "response": {
                    "title": "Response",
                    "description": "the next (short, 5-10 words) response to the user in your conversation.",
                    "type": "string"
                }
            },
            "required": ["response"]
        })
    }
}

/// Payload for the text-to-speech consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TtsRequest {
    pub text: String,
    pub language: String,
}

/// Successful conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvoReply {
    /// Text to show/speak next
    pub response: String,
    pub to_tts: TtsRequest,
}

/// Result of a conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvoOutcome {
    /// The LLM answered in the expected shape
    Reply(ConvoReply),
    /// The LLM output did not match the schema
    ParseFailure(ParseError),
}

impl ConvoOutcome {
    /// The reply, if parsing succeeded
    #[must_use]
    pub fn into_reply(self) -> Option<ConvoReply> {
        match self {
            Self::Reply(reply) => Some(reply),
            Self::ParseFailure(_) => None,
        }
    }
}

/// Render history one `role: text` line per turn
#[must_use]
pub fn format_history(turns: &[ConversationTurn]) -> String {
    turns.iter().fold(String::new(), |mut out, turn| {
        let _ = writeln!(out, "{}: {}", turn.role, turn.text);
        out
    })
}

/// Conversation agent over an LLM backend
pub struct ConvoAgent<L> {
    llm: L,
    temperature: f32,
    parser: OutputParser<ConvoResponse>,
}

impl<L: LlmClient> ConvoAgent<L> {
    #[must_use]
    pub const fn new(llm: L) -> Self {
        Self {
            llm,
            temperature: DEFAULT_TEMPERATURE,
            parser: OutputParser::new(),
        }
    }

    /// Override the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Compose the full prompt for a request
    #[must_use]
    pub fn build_prompt(&self, request: &ConvoRequest) -> String {
        let places = request.places.join("\n");
        let history = format_history(&request.conversation_history);
        let format_instructions = self.parser.format_instructions();
        let target_language = &request.target_language;
        let fluency_level = request.fluency_level;

        format!(
            "You are polyglot expert language teacher. You help the language learner by talking to them about their environment.

Target Language: {target_language}
Fluency Level: {fluency_level}

Your job:
Have a simple conversation with the user, in the language they're trying to learn, about the world around them. Do so by considering what the conversation so far, nearby points of interest as conversation topics, and the user's fluency level to moderate the complexity of your outputs. Responses should be short (5-10 words).

Nearby Points of Interest:
{places}

Examples:
Input 1: 35, Starbucks Coffee, Russian
Output 1: Какой ваш любимый напиток в Starbucks Coffee?
Input 2: 52, [], French
Output 2: Que faites-vous actuellement pour vivre?
Input 3: 61, The British Museum, Chinese
Output 3: 如何询问去大英博物馆内某个展览的路线？

Remember that this is a conversation, your next output should be a continuation of the conversation. Don't repeat things you previously said! Responses should be short (5-10 words).

Here is the conversation so far (you are the agent) which all the user will ever see:
{history}

Now provide the (very short) output in {target_language} which continues the above conversation.

Output Format: {format_instructions}"
        )
    }

    /// Run one conversation turn
    ///
    /// # Errors
    ///
    /// Returns error if the LLM call fails. A reply that does not match the
    /// schema is not an error; it comes back as [`ConvoOutcome::ParseFailure`].
    #[tracing::instrument(
        skip_all,
        fields(target_language = %request.target_language, fluency = request.fluency_level)
    )]
    pub async fn respond(&self, request: &ConvoRequest) -> Result<ConvoOutcome> {
        let started = Instant::now();

        let prompt = self.build_prompt(request);
        tracing::debug!(%prompt, "convo prompt");

        let raw = self.llm.complete(&prompt, self.temperature).await?;

        let parsed = match self.parser.parse(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, raw = %e.raw, "convo response did not match schema");
                return Ok(ConvoOutcome::ParseFailure(e));
            }
        };

        let response = if needs_pinyin(&request.target_language) {
            to_pinyin(&parsed.response)
        } else {
            parsed.response
        };

        let reply = ConvoReply {
            to_tts: TtsRequest {
                text: response.clone(),
                language: request.target_language.clone(),
            },
            response,
        };

        tracing::info!(
            response = %reply.response,
            elapsed_ms = started.elapsed().as_millis(),
            "convo response"
        );

        Ok(ConvoOutcome::Reply(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let request = ConvoRequest::default();
        assert_eq!(request.target_language, "Russian");
        assert_eq!(request.fluency_level, 35);
    }

    #[test]
    fn test_format_history() {
        let turns = vec![
            ConversationTurn::new("agent", "Привет!"),
            ConversationTurn::new("user", "Привет, как дела?"),
        ];
        assert_eq!(
            format_history(&turns),
            "agent: Привет!\nuser: Привет, как дела?\n"
        );
        assert_eq!(format_history(&[]), "");
    }

    #[test]
    fn test_outcome_into_reply() {
        let failure = ConvoOutcome::ParseFailure(ParseError {
            reason: "bad".to_string(),
            raw: String::new(),
        });
        assert!(failure.into_reply().is_none());
    }
}
