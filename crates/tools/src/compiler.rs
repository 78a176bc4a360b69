//! Plugin compiler: manifest in, tools and prompt text out.
//!
//! Each endpoint yields exactly one [`PluginTool`] whose description lists
//! its parameters, an optional payload example and a one-line summary. The
//! combined description that goes into the prompt is:
//!
//! ```text
//! TOOLS:
//! -----
//! You have access to the following tools:
//!
//! > getTodos
//! OpenAPI specification
//! parameters:
//!  name: "username",
//!  ...
//! tool description: Get the list of todos
//!
//! todo plugin description:
//! <description_for_model, truncated>
//!
//! <tool-use instructions>
//! ```
//!
//! Plugin text is emitted verbatim. It is substituted into prompt templates
//! as a field value and never re-parsed, so braces need no escaping.

use crate::invoker::HttpInvoker;
use crate::manifest::{ManifestLoader, ManifestSource};
use crate::plugin_tool::PluginTool;
use crate::prompts::{self, TOOLS_PREFIX};
use crate::truncate::truncate_str;
use plugchain_config::{ChainConfig, PluginConfig};
use plugchain_core::plugin::{Endpoint, Parameter, PluginManifest};
use plugchain_core::tool::ToolSet;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// The result of compiling one plugin.
#[derive(Debug, Clone, Default)]
pub struct CompiledPlugin {
    /// Prompt text describing the tools. Empty when no tools are available.
    pub description: String,
    pub tools: ToolSet,
}

impl CompiledPlugin {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Compiles plugin manifests into tool sets.
pub struct PluginCompiler {
    loader: ManifestLoader,
    invoker: Arc<HttpInvoker>,
    config: PluginConfig,
    instructions: String,
}

impl PluginCompiler {
    pub fn new(plugin: &PluginConfig, chain: &ChainConfig) -> Self {
        Self {
            loader: ManifestLoader::from_config(plugin),
            invoker: Arc::new(HttpInvoker::from_config(plugin)),
            config: plugin.clone(),
            instructions: prompts::instructions(&chain.final_answer_prefix, &chain.observation_separator),
        }
    }

    /// Replace the tool-use instructions appended to the description.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Load and compile the plugin behind `source`.
    ///
    /// An unreachable or malformed plugin compiles to no tools at all; the
    /// conversation carries on without them.
    pub async fn compile(&self, source: &ManifestSource) -> CompiledPlugin {
        match self.loader.load(source).await {
            Ok(manifest) => self.compile_manifest(&manifest),
            Err(e) => {
                warn!(source = %source, error = %e, "Plugin unavailable, continuing without tools");
                CompiledPlugin::empty()
            }
        }
    }

    /// Compile an already-loaded manifest.
    pub fn compile_manifest(&self, manifest: &PluginManifest) -> CompiledPlugin {
        if let Err(e) = manifest.validate() {
            warn!(plugin = %manifest.name_for_model, error = %e, "Invalid plugin manifest");
            return CompiledPlugin::empty();
        }
        if manifest.endpoints.is_empty() {
            return CompiledPlugin::empty();
        }

        let mut tools = ToolSet::new();
        for endpoint in &manifest.endpoints {
            let description = self.describe_endpoint(endpoint);
            let tool = PluginTool::new(endpoint.clone(), description, Arc::clone(&self.invoker));
            if let Err(e) = tools.register(Arc::new(tool)) {
                warn!(plugin = %manifest.name_for_model, error = %e, "Invalid plugin manifest");
                return CompiledPlugin::empty();
            }
        }

        let tools_string = tools
            .iter()
            .map(|t| format!("> {}{}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let plugin_description =
            truncate_str(&manifest.description_for_model, self.config.description_max_length);

        let description = format!(
            "{TOOLS_PREFIX}{tools_string}\n\n{} plugin description:\n{plugin_description}\n\n{}",
            manifest.name_for_model, self.instructions
        );

        info!(plugin = %manifest.name_for_model, tools = tools.len(), "Compiled plugin");
        CompiledPlugin { description, tools }
    }

    fn describe_endpoint(&self, endpoint: &Endpoint) -> String {
        let params = endpoint
            .params
            .iter()
            .map(|p| self.describe_parameter(p))
            .collect::<Vec<_>>()
            .join("\n\n");

        let payload_description = endpoint
            .payload
            .as_ref()
            .and_then(|payload| match to_indented_json(payload) {
                Ok(json) => Some(format!(
                    "payload: {}",
                    truncate_str(&json, self.config.payload_example_max_length)
                )),
                Err(e) => {
                    warn!(operation = %endpoint.operation_id, error = %e, "Failed to render payload example");
                    None
                }
            })
            .unwrap_or_default();

        let parameters_description = if params.is_empty() {
            "\n".to_string()
        } else {
            format!("parameters:\n{params}\n")
        };
        let title = if params.is_empty() && payload_description.is_empty() {
            ""
        } else {
            "\nOpenAPI specification\n"
        };

        format!(
            "{title}{parameters_description}{payload_description}tool description: {}\n",
            endpoint.summary
        )
    }

    fn describe_parameter(&self, param: &Parameter) -> String {
        let schema = if param.schema.is_null() {
            "{}".to_string()
        } else {
            param.schema.to_string()
        };
        format!(
            " name: \"{}\",\n in: \"{}\",\n description: \"{}\",\n schema: {},\n required: {}",
            param.name,
            param.location,
            truncate_str(&param.description, self.config.parameter_description_max_length),
            schema,
            param.required
        )
    }
}

/// Pretty-print JSON with four-space indentation.
fn to_indented_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
