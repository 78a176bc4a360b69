//! Shared test helpers for session tests.

use crate::session::TextGenerator;
use async_trait::async_trait;
use plugchain_core::error::GenerationError;
use plugchain_core::tool::Tool;
use std::sync::Mutex;

/// A generator that returns a sequence of scripted completions.
///
/// Each call to `generate` returns the next completion in the queue and
/// records the prompt it was given. Panics if more calls are made than
/// completions provided.
pub struct ScriptedGenerator {
    outputs: Mutex<Vec<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(outputs: Vec<&str>) -> Self {
        Self::with_results(outputs.into_iter().map(|o| Ok(o.to_string())).collect())
    }

    pub fn with_results(outputs: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            outputs: Mutex::new(outputs),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _stop: &[String]) -> Result<String, GenerationError> {
        let mut prompts = self.prompts.lock().unwrap();
        let mut outputs = self.outputs.lock().unwrap();
        if outputs.is_empty() {
            panic!(
                "ScriptedGenerator: no more outputs (call #{})",
                prompts.len()
            );
        }
        prompts.push(prompt.to_string());
        outputs.remove(0)
    }
}

/// A tool that answers every call with a fixed string.
pub struct StaticTool {
    pub name: &'static str,
    pub reply: &'static str,
    pub calls: Mutex<Vec<String>>,
}

impl StaticTool {
    pub fn new(name: &'static str, reply: &'static str) -> Self {
        Self {
            name,
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "static test tool"
    }

    async fn call(&self, input: &str) -> String {
        self.calls.lock().unwrap().push(input.to_string());
        self.reply.to_string()
    }
}
