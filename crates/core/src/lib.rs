//! # plugchain core
//!
//! Domain types, traits, and error definitions for the plugin tool-use loop.
//! This crate has **no transport dependencies**; it defines the model that
//! the compiler, invoker, and agent crates implement against.
//!
//! - [`plugin`]: the manifest a plugin is described by (endpoints, parameters)
//! - [`tool`]: the callable unit compiled from one endpoint, and the ordered set of them
//! - [`action`]: what the model asked for on a given turn
//! - [`message`]: the per-session conversation buffer

pub mod action;
pub mod error;
pub mod message;
pub mod plugin;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use action::{FinalKind, ParsedAction};
pub use error::{Error, GenerationError, PluginError, Result, ToolError};
pub use message::{ConversationMemory, Role, Turn};
pub use plugin::{Endpoint, HttpMethod, ParamLocation, Parameter, PluginManifest};
pub use tool::{Tool, ToolSet};
