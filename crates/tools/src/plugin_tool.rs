//! A tool compiled from one plugin endpoint.

use crate::invoker::HttpInvoker;
use async_trait::async_trait;
use plugchain_core::plugin::{Endpoint, ParamLocation};
use plugchain_core::tool::Tool;
use std::sync::Arc;

/// Callable wrapper around a single [`Endpoint`].
///
/// Captures the endpoint and the location its parameters travel in, so the
/// model only has to pick a tool and supply values.
pub struct PluginTool {
    description: String,
    endpoint: Endpoint,
    location: ParamLocation,
    invoker: Arc<HttpInvoker>,
}

impl PluginTool {
    pub fn new(endpoint: Endpoint, description: String, invoker: Arc<HttpInvoker>) -> Self {
        let location = endpoint.primary_location();
        Self {
            description,
            endpoint,
            location,
            invoker,
        }
    }

    pub fn location(&self) -> ParamLocation {
        self.location
    }
}

#[async_trait]
impl Tool for PluginTool {
    fn name(&self) -> &str {
        &self.endpoint.operation_id
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, input: &str) -> String {
        self.invoker.invoke(&self.endpoint, self.location, input).await
    }
}
