//! plugchain CLI, the main entry point.
//!
//! Commands:
//! - `compile`: Load a plugin and print the tool description the model sees
//! - `parse`: Parse model output into an action
//! - `call`: Invoke one plugin tool and print the observation
//! - `prompt`: Render the prompt for a user message
//! - `config`: Print the default configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "plugchain",
    about = "plugchain: LLM plugin tool-use loop",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a plugin (URL, file path, or ai-plugin.json) into tools
    Compile {
        /// Plugin location
        source: String,
    },

    /// Parse model output into an action (reads stdin when TEXT is omitted)
    Parse {
        /// Final answer prefix
        #[arg(short, long, default_value = "Final Answer")]
        prefix: String,

        text: Option<String>,
    },

    /// Call a plugin tool with raw action input
    Call {
        /// Plugin location
        source: String,
        /// Tool name (approximate names are resolved)
        tool: String,
        /// Action input, usually a JSON object
        input: String,
    },

    /// Render the prompt for a user message
    Prompt {
        input: String,

        /// Enable a plugin for the prompt
        #[arg(short, long, env = "PLUGCHAIN_PLUGIN")]
        plugin: Option<String>,
    },

    /// Print the default configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile { source } => commands::compile::run(&source).await?,
        Commands::Parse { prefix, text } => commands::parse::run(&prefix, text)?,
        Commands::Call {
            source,
            tool,
            input,
        } => commands::call::run(&source, &tool, &input).await?,
        Commands::Prompt { input, plugin } => commands::prompt::run(&input, plugin).await?,
        Commands::Config => commands::config_cmd::show()?,
    }

    Ok(())
}
