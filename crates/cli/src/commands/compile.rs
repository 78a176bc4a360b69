//! `plugchain compile`: Show what a plugin compiles to.

use plugchain_tools::{ManifestSource, PluginCompiler};

pub async fn run(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let compiler = PluginCompiler::new(&config.plugin, &config.chain);
    let source = ManifestSource::parse(source);

    let compiled = compiler.compile(&source).await;
    if compiled.is_empty() {
        return Err(format!("No tools could be compiled from {source}").into());
    }

    println!("{}", compiled.description);
    println!();
    println!("Tools ({}):", compiled.tools.len());
    for tool in compiled.tools.iter() {
        println!("  {}", tool.name());
    }
    Ok(())
}
