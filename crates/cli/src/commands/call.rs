//! `plugchain call`: Invoke a single plugin tool.

use plugchain_agent::{invalid_tool_observation, resolve};
use plugchain_tools::{ManifestSource, PluginCompiler};

pub async fn run(source: &str, tool: &str, input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let compiler = PluginCompiler::new(&config.plugin, &config.chain);
    let compiled = compiler.compile(&ManifestSource::parse(source)).await;

    let observation = match resolve(tool, &compiled.tools) {
        Some(found) => {
            if found.name() != tool {
                eprintln!("Resolved {tool} to {}", found.name());
            }
            found.call(input).await
        }
        None => invalid_tool_observation(tool),
    };
    println!("{observation}");
    Ok(())
}
