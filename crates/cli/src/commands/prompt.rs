//! `plugchain prompt`: Render the first prompt of a turn.

use plugchain_agent::ChatSession;
use plugchain_tools::ManifestSource;

pub async fn run(input: &str, plugin: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let tokenizer = super::tokenizer(&config)?;
    let limit = config.worker.max_input_length;

    let mut session = ChatSession::new(config, tokenizer.clone());
    if let Some(source) = plugin {
        session = session.with_plugin(ManifestSource::parse(&source));
    }

    let prompt = session.prompt_for(input).await;
    println!("{prompt}");
    eprintln!();
    eprintln!("{} / {limit} tokens", tokenizer.count(&prompt));
    Ok(())
}
