//! Language-learning conversation agent

pub mod convo;
pub mod parser;
pub mod romanize;

pub use convo::{
    ConversationTurn, ConvoAgent, ConvoOutcome, ConvoReply, ConvoRequest, ConvoResponse,
    TtsRequest,
};
pub use parser::{OutputParser, OutputSchema, ParseError};
pub use romanize::{CHINESE_PINYIN, to_pinyin};
