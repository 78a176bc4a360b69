//! Prompt assembler with soft truncation.
//!
//! The template is rendered with the full conversation history; while the
//! result exceeds the token limit the oldest history entry is evicted and
//! the prompt re-rendered. Eviction stops when history is empty, so the
//! returned prompt may still be over the limit; [`hard_truncate`] handles
//! that afterwards.
//!
//! [`hard_truncate`]: crate::context::token::hard_truncate

use crate::context::template::{PromptFields, PromptTemplate};
use crate::context::token::SharedTokenizer;
use plugchain_core::message::ConversationMemory;
use tracing::{debug, warn};

/// Per-call inputs for one prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptRequest<'a> {
    pub input: &'a str,
    pub language: &'a str,
    pub current_time: &'a str,
    pub tools_names: &'a [String],
    pub tools_description: &'a str,
    pub human_prefix: &'a str,
    pub ai_prefix: &'a str,
}

/// The result of a single assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub text: String,
    /// Token count of `text`.
    pub tokens: usize,
    /// History entries evicted to fit.
    pub evicted: usize,
}

impl AssembledPrompt {
    pub fn fits(&self, limit: usize) -> bool {
        self.tokens <= limit
    }
}

#[derive(Debug, Clone)]
pub struct PromptAssembler {
    template: PromptTemplate,
    tokenizer: SharedTokenizer,
    token_limit: usize,
}

impl PromptAssembler {
    pub fn new(template: PromptTemplate, tokenizer: SharedTokenizer, token_limit: usize) -> Self {
        Self {
            template,
            tokenizer,
            token_limit,
        }
    }

    /// Render the prompt, evicting the oldest entries of `memory` until it fits.
    pub fn assemble(&self, memory: &mut ConversationMemory, request: &PromptRequest<'_>) -> AssembledPrompt {
        let mut text = self.render(memory, request);
        let mut tokens = self.tokenizer.count(&text);
        let mut evicted = 0;

        while tokens > self.token_limit && memory.evict_oldest().is_some() {
            evicted += 1;
            text = self.render(memory, request);
            tokens = self.tokenizer.count(&text);
            warn!(
                tokens,
                limit = self.token_limit,
                evicted,
                "Prompt too long, evicted oldest history entry"
            );
        }

        debug!(tokens, evicted, remaining = memory.len(), "Prompt assembled");

        AssembledPrompt {
            text,
            tokens,
            evicted,
        }
    }

    fn render(&self, memory: &ConversationMemory, request: &PromptRequest<'_>) -> String {
        let fields = PromptFields {
            input: request.input.to_string(),
            language: request.language.to_string(),
            current_time: request.current_time.to_string(),
            chat_history: memory.buffer(),
            tools_names: request.tools_names.to_vec(),
            tools_description: request.tools_description.to_string(),
            human_prefix: request.human_prefix.to_string(),
            ai_prefix: request.ai_prefix.to_string(),
        };
        self.template.render(&fields)
    }
}
