//! Plugin manifest domain types.
//!
//! A [`PluginManifest`] is the normalised description of one plugin: a name
//! and description meant for the model, plus the ordered endpoints it
//! exposes. Loaders (ai-plugin + OpenAPI, local files) produce it; the
//! compiler consumes it. Once compiled for a session it is never mutated.

use crate::error::PluginError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The normalised description of a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Short identifier the model refers to the plugin by.
    pub name_for_model: String,

    /// Model-facing description of what the plugin does.
    #[serde(default)]
    pub description_for_model: String,

    /// Endpoints in declaration order.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl PluginManifest {
    /// Check the invariants a manifest must hold before it can be compiled.
    ///
    /// Operation ids double as tool names, so they must be unique.
    pub fn validate(&self) -> Result<(), PluginError> {
        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            if endpoint.operation_id.trim().is_empty() {
                return Err(PluginError::InvalidManifest(format!(
                    "endpoint {} has an empty operation id",
                    endpoint.url
                )));
            }
            if !seen.insert(endpoint.operation_id.as_str()) {
                return Err(PluginError::DuplicateOperation(endpoint.operation_id.clone()));
            }
        }
        Ok(())
    }
}

/// One callable operation of a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Operation identifier, unique within the manifest.
    pub operation_id: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// Absolute URL, possibly containing `{param}` path placeholders.
    pub url: String,

    /// Parameters in declaration order.
    #[serde(default)]
    pub params: Vec<Parameter>,

    /// Example request body, if the operation takes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,

    /// One-line human summary.
    #[serde(default)]
    pub summary: String,
}

impl Endpoint {
    /// Location of the first parameter, or `query` for parameterless endpoints.
    pub fn primary_location(&self) -> ParamLocation {
        self.params
            .first()
            .map(|p| p.location)
            .unwrap_or(ParamLocation::Query)
    }
}

/// A single endpoint parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParamLocation,

    #[serde(default)]
    pub description: String,

    /// JSON schema of the value.
    #[serde(default)]
    pub schema: serde_json::Value,

    #[serde(default)]
    pub required: bool,
}

/// Where a parameter travels in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

impl std::fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method of an endpoint.
///
/// Only `GET` and `POST` are invocable; anything else is kept verbatim so the
/// invoker can report it back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Other(String),
}

impl From<String> for HttpMethod {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<HttpMethod> for String {
    fn from(m: HttpMethod) -> Self {
        m.to_string()
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
            Self::Other(m) => f.write_str(m),
        }
    }
}
