//! Prompt assembly pipeline.
//!
//! | Stage | Module | Effect on overflow |
//! |-------|--------|--------------------|
//! | Template rendering | [`template`] | none |
//! | Soft truncation | [`assembler`] | oldest history entries evicted |
//! | Hard truncation | [`token::hard_truncate`] | prompt head cut |

pub mod assembler;
pub mod template;
pub mod token;

pub use assembler::{AssembledPrompt, PromptAssembler, PromptRequest};
pub use template::{DEFAULT_TEMPLATE, DEFAULT_TOOLS_TEMPLATE, Field, PromptFields, PromptTemplate};
pub use token::{HeuristicCounter, SharedTokenizer, TokenCounter, estimate_tokens, hard_truncate};

#[cfg(feature = "hf-tokenizer")]
pub use token::HfTokenCounter;
