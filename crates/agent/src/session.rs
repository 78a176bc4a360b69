//! Chat session: one conversation driving the tool-use loop.
//!
//! Each turn follows an **Assemble → Generate → Parse → Act** cycle:
//!
//! 1. Render the prompt (soft truncation evicts old history, then hard
//!    truncation cuts the head if it is still too long)
//! 2. Generate with the observation separator as the stop sequence
//! 3. Parse the completion into a [`ParsedAction`]
//! 4. On a final answer, record the exchange and return; on a tool action,
//!    resolve and call the tool, append the observation to the turn's
//!    transcript and loop back to step 1
//!
//! The loop ends after `max_steps` tool calls at the latest. Memory is only
//! written once a turn completes, so a cancelled turn leaves no half-written
//! exchange behind.

use crate::context::{
    DEFAULT_TOOLS_TEMPLATE, PromptAssembler, PromptRequest, PromptTemplate, SharedTokenizer,
    hard_truncate,
};
use crate::parser::ActionParser;
use crate::resolver::{invalid_tool_observation, resolve};
use async_trait::async_trait;
use chrono::Utc;
use plugchain_config::AppConfig;
use plugchain_core::action::ParsedAction;
use plugchain_core::error::{GenerationError, Result};
use plugchain_core::message::ConversationMemory;
use plugchain_tools::{CompiledPlugin, ManifestSource, PluginCompiler};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Produces a completion for a prompt. Implemented by the inference backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, stop: &[String]) -> std::result::Result<String, GenerationError>;
}

/// One tool call made during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStep {
    /// Tool name as written by the model.
    pub action: String,
    /// Tool the name resolved to, if any.
    pub tool: Option<String>,
    pub input: String,
    pub observation: String,
}

/// The result of [`ChatSession::turn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub answer: String,
    pub steps: Vec<ToolStep>,
    /// True when the step limit was reached before a final answer.
    pub exhausted: bool,
}

pub struct ChatSession {
    config: AppConfig,
    memory: ConversationMemory,
    tokenizer: SharedTokenizer,
    parser: ActionParser,
    chat_template: PromptTemplate,
    tools_template: PromptTemplate,
    plugin: Option<ManifestSource>,
    compiled: OnceCell<Arc<CompiledPlugin>>,
}

impl ChatSession {
    pub fn new(config: AppConfig, tokenizer: SharedTokenizer) -> Self {
        let chain = &config.chain;
        let memory = ConversationMemory::new(&chain.human_prefix, &chain.ai_prefix);
        let parser = ActionParser::new(&chain.final_answer_prefix, &chain.observation_separator);
        Self {
            memory,
            tokenizer,
            parser,
            chat_template: PromptTemplate::default(),
            tools_template: PromptTemplate::parse(DEFAULT_TOOLS_TEMPLATE),
            plugin: None,
            compiled: OnceCell::new(),
            config,
        }
    }

    /// Enable a plugin. It is compiled on first use.
    pub fn with_plugin(mut self, source: ManifestSource) -> Self {
        self.plugin = Some(source);
        self.compiled = OnceCell::new();
        self
    }

    /// Use an already-compiled tool set.
    pub fn with_tools(mut self, plugin: CompiledPlugin) -> Self {
        self.compiled = OnceCell::new_with(Some(Arc::new(plugin)));
        self
    }

    /// Replace the prompt templates used without and with tools.
    pub fn with_templates(mut self, chat: PromptTemplate, tools: PromptTemplate) -> Self {
        self.chat_template = chat;
        self.tools_template = tools;
        self
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ConversationMemory {
        &mut self.memory
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The session's tools, compiling the plugin on first call.
    pub async fn tools(&self) -> Arc<CompiledPlugin> {
        let plugin = self.plugin.as_ref();
        let config = &self.config;
        self.compiled
            .get_or_init(|| async move {
                match plugin {
                    Some(source) => {
                        let compiler = PluginCompiler::new(&config.plugin, &config.chain);
                        Arc::new(compiler.compile(source).await)
                    }
                    None => Arc::new(CompiledPlugin::empty()),
                }
            })
            .await
            .clone()
    }

    /// Render the prompt for `input` without generating.
    pub async fn prompt_for(&mut self, input: &str) -> String {
        let plugin = self.tools().await;
        self.build_prompt(input, &plugin)
    }

    /// Run one user turn to completion.
    pub async fn turn(&mut self, input: &str, generator: &dyn TextGenerator) -> Result<TurnOutcome> {
        let plugin = self.tools().await;
        let max_steps = self.config.chain.max_steps;
        let stop = vec![self.config.chain.observation_separator.clone()];
        let mut transcript = String::new();
        let mut steps = Vec::new();

        info!(tools = plugin.tools.len(), "Starting turn");

        loop {
            let turn_input = if transcript.is_empty() {
                input.to_string()
            } else {
                format!("{input}\n{transcript}")
            };
            let prompt = self.build_prompt(&turn_input, &plugin);

            let output = generator.generate(&prompt, &stop).await?;
            debug!(step = steps.len(), output_len = output.len(), "Generated");

            let (action, action_input) = match self.parser.parse(&output) {
                ParsedAction::Final { answer, kind } => {
                    debug!(?kind, "Final answer");
                    return Ok(self.finish(input, answer, steps, false));
                }
                ParsedAction::Invoke { tool, input } => (tool, input),
            };

            if steps.len() >= max_steps {
                warn!(max_steps, "Step limit reached without a final answer");
                return Ok(self.finish(input, output.trim().to_string(), steps, true));
            }

            let (resolved, observation) = match resolve(&action, &plugin.tools) {
                Some(tool) => (Some(tool.name().to_string()), tool.call(&action_input).await),
                None => (None, invalid_tool_observation(&action)),
            };
            info!(action = %action, tool = ?resolved, "Tool step");

            transcript.push_str(&format!(
                "{}\n{} {}\n",
                output.trim(),
                self.config.chain.observation_separator,
                observation
            ));
            steps.push(ToolStep {
                action,
                tool: resolved,
                input: action_input,
                observation,
            });
        }
    }

    fn build_prompt(&mut self, input: &str, plugin: &CompiledPlugin) -> String {
        let template = if plugin.is_empty() {
            self.chat_template.clone()
        } else {
            self.tools_template.clone()
        };
        let limit = self.config.worker.max_input_length;
        let assembler = PromptAssembler::new(template, self.tokenizer.clone(), limit);

        let names = plugin.tools.names();
        let current_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let request = PromptRequest {
            input,
            language: &self.config.worker.language,
            current_time: &current_time,
            tools_names: &names,
            tools_description: &plugin.description,
            human_prefix: &self.config.chain.human_prefix,
            ai_prefix: &self.config.chain.ai_prefix,
        };

        let assembled = assembler.assemble(&mut self.memory, &request);
        if assembled.fits(limit) {
            assembled.text
        } else {
            hard_truncate(&assembled.text, &self.tokenizer, limit)
        }
    }

    fn finish(&mut self, input: &str, answer: String, steps: Vec<ToolStep>, exhausted: bool) -> TurnOutcome {
        self.memory.push_user(input);
        self.memory.push_assistant(&answer);
        TurnOutcome {
            answer,
            steps,
            exhausted,
        }
    }
}
