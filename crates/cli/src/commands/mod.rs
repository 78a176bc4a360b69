pub mod call;
pub mod compile;
pub mod config_cmd;
pub mod parse;
pub mod prompt;

use plugchain_agent::SharedTokenizer;
use plugchain_config::AppConfig;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The configured tokenizer, or the character heuristic.
pub fn tokenizer(config: &AppConfig) -> Result<SharedTokenizer, Box<dyn std::error::Error>> {
    #[cfg(feature = "hf-tokenizer")]
    if let Some(path) = &config.worker.tokenizer_path {
        let counter = plugchain_agent::context::HfTokenCounter::from_file(path)?;
        return Ok(SharedTokenizer::new(counter));
    }

    if let Some(path) = &config.worker.tokenizer_path {
        tracing::warn!(path = %path, "Built without hf-tokenizer, using character estimate");
    }
    Ok(SharedTokenizer::heuristic())
}
