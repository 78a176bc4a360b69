//! The plugchain tool-use loop.
//!
//! - [`parser`] turns a model completion into a [`ParsedAction`](plugchain_core::ParsedAction)
//! - [`resolver`] maps a possibly misspelled tool name onto a registered tool
//! - [`context`] renders prompts within the model's token limit
//! - [`session`] drives a conversation turn through all of the above

pub mod context;
pub mod parser;
pub mod resolver;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{
    AssembledPrompt, HeuristicCounter, PromptAssembler, PromptFields, PromptRequest,
    PromptTemplate, SharedTokenizer, TokenCounter, hard_truncate,
};
pub use parser::{ActionParser, parse_action};
pub use resolver::{SIMILARITY_THRESHOLD, invalid_tool_observation, resolve, similarity, use_tool};
pub use session::{ChatSession, TextGenerator, ToolStep, TurnOutcome};
