//! Error types for the plugchain domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Note that failures *inside* a tool invocation are not errors at this
//! level: they become `ERROR!` observations handed back to the model.

use thiserror::Error;

/// The top-level error type for all plugchain operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Plugin errors ---
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum PluginError {
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Fetching {url} returned status {status_code}")]
    BadStatus { url: String, status_code: u16 },

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Invalid plugin document: {0}")]
    InvalidManifest(String),

    #[error("Invalid OpenAPI document: {0}")]
    InvalidSpec(String),

    #[error("Duplicate operation id in manifest: {0}")]
    DuplicateOperation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Duplicate tool name: {0}")]
    Duplicate(String),
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Text generation failed: {0}")]
    Failed(String),

    #[error("Text generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Session closed")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_error_displays_correctly() {
        let err = Error::Plugin(PluginError::BadStatus {
            url: "https://weather.example/.well-known/ai-plugin.json".into(),
            status_code: 404,
        });
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("ai-plugin.json"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::Duplicate("get_weather".into()));
        assert!(err.to_string().contains("get_weather"));
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn generation_timeout_mentions_seconds() {
        let err = GenerationError::Timeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "Text generation timed out after 30s");
    }
}
