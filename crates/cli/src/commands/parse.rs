//! `plugchain parse`: Parse model output.

use plugchain_agent::ActionParser;
use std::io::Read;

pub fn run(prefix: &str, text: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let config = super::load_config()?;
    let parser = ActionParser::new(prefix, &config.chain.observation_separator);
    let action = parser.parse(&text);
    println!("{}", serde_json::to_string_pretty(&action)?);
    Ok(())
}
