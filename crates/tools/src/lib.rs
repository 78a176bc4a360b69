//! Plugin tooling for plugchain.
//!
//! Turns an external plugin description into callable tools:
//!
//! 1. [`manifest`] loads a plugin (ai-plugin document + OpenAPI spec, or a
//!    ready-made manifest) into a [`PluginManifest`](plugchain_core::PluginManifest)
//! 2. [`compiler`] builds one [`PluginTool`] per endpoint plus the prompt
//!    text describing them
//! 3. [`invoker`] executes a tool's HTTP request and turns whatever comes
//!    back into an observation string for the model

pub mod compiler;
pub mod invoker;
pub mod manifest;
pub mod plugin_tool;
pub mod prompts;
pub mod truncate;

pub use compiler::{CompiledPlugin, PluginCompiler};
pub use invoker::HttpInvoker;
pub use manifest::{ManifestLoader, ManifestSource};
pub use plugin_tool::PluginTool;
pub use truncate::truncate_str;
