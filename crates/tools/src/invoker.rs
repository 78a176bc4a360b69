//! HTTP invocation of plugin endpoints.
//!
//! The invoker is the boundary between the agent loop and third-party
//! APIs. Every outcome, including transport failures, bad statuses and
//! malformed model input, comes back as an observation string. Errors are
//! prefixed with `ERROR!` and phrased so the model can retry with a
//! modified `Action Input`.

use crate::truncate::truncate_str;
use plugchain_config::PluginConfig;
use plugchain_core::plugin::{Endpoint, HttpMethod, ParamLocation};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default cap on a successful response body, in characters.
pub const RESPONSE_MAX_LENGTH: usize = 2048;

/// A failed invocation. `Display` is the observation shown to the model.
#[derive(Debug, thiserror::Error)]
enum InvokeFailure {
    #[error("ERROR! Action Input must be a JSON object of parameters.\n{0}. Try again!")]
    InvalidInput(String),

    #[error("ERROR! Unsupported request type: {0}. Only GET and POST are supported. Try again!")]
    UnsupportedMethod(String),

    #[error("ERROR! That didn't work, try modifying Action Input.\nStatus {status}: {body}. Try again!")]
    Status { status: u16, body: String },

    #[error("ERROR! That didn't work, try modifying Action Input.\nEmpty response. Try again!")]
    EmptyResponse,

    #[error("ERROR! The request timed out after {0}s, try modifying Action Input. Try again!")]
    Timeout(u64),

    #[error("ERROR! That didn't work, try modifying Action Input.\n{0}. Try again!")]
    Transport(String),
}

/// Executes endpoint requests on behalf of compiled tools.
///
/// Holds no per-call state; one invoker is shared by every tool of a plugin.
pub struct HttpInvoker {
    client: reqwest::Client,
    timeout: Duration,
    response_max_length: usize,
}

impl HttpInvoker {
    pub fn new(timeout: Duration, response_max_length: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            response_max_length,
        }
    }

    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(
            Duration::from_secs(config.request_timeout_secs),
            config.response_max_length,
        )
    }

    /// Call `endpoint` with the model-provided `raw_input`.
    ///
    /// `location` is where the endpoint's parameters travel; for `path`
    /// every `{key}` placeholder in the URL is filled from the input and
    /// nothing is left over for the query string.
    pub async fn invoke(&self, endpoint: &Endpoint, location: ParamLocation, raw_input: &str) -> String {
        match self.try_invoke(endpoint, location, raw_input).await {
            Ok(body) => body,
            Err(failure) => {
                debug!(operation = %endpoint.operation_id, error = ?failure, "Plugin request failed");
                failure.to_string()
            }
        }
    }

    async fn try_invoke(
        &self,
        endpoint: &Endpoint,
        location: ParamLocation,
        raw_input: &str,
    ) -> Result<String, InvokeFailure> {
        let mut params = parse_params(raw_input)?;
        let payload = params.remove("payload").map(decode_payload);

        warn!(
            method = %endpoint.method,
            url = %endpoint.url,
            param_location = %location,
            has_payload = payload.is_some(),
            "Running plugin request"
        );

        let mut url = endpoint.url.clone();
        if location == ParamLocation::Path {
            for (key, value) in &params {
                url = url.replace(&format!("{{{key}}}"), &encode_path_segment(&param_string(value)));
            }
            params.clear();
        }

        let request = match &endpoint.method {
            HttpMethod::Get => self.client.get(&url).query(&query_pairs(&params)),
            HttpMethod::Post => {
                let (body, query) = match payload {
                    Some(payload) => (payload, query_pairs(&params)),
                    None => (Value::Object(params), Vec::new()),
                };
                self.client
                    .post(&url)
                    .query(&query)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.to_string())
            }
            HttpMethod::Other(method) => {
                return Err(InvokeFailure::UnsupportedMethod(method.clone()));
            }
        };

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_failure(e))?;

        process_response(status, &body, self.response_max_length)
    }

    fn transport_failure(&self, err: reqwest::Error) -> InvokeFailure {
        if err.is_timeout() {
            InvokeFailure::Timeout(self.timeout.as_secs())
        } else {
            InvokeFailure::Transport(err.to_string())
        }
    }
}

impl Default for HttpInvoker {
    fn default() -> Self {
        Self::from_config(&PluginConfig::default())
    }
}

/// Parse the model's input into a parameter map.
///
/// Blank input is accepted as "no parameters".
fn parse_params(raw_input: &str) -> Result<Map<String, Value>, InvokeFailure> {
    let trimmed = raw_input.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(InvokeFailure::InvalidInput(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(InvokeFailure::InvalidInput(e.to_string())),
    }
}

/// A payload given as a JSON-encoded string is decoded; anything else is sent as-is.
fn decode_payload(payload: Value) -> Value {
    match payload {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}

fn param_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Percent-encode `value` as a single path segment, so `/`, `?` and `#`
/// stay inside the segment.
fn encode_path_segment(value: &str) -> String {
    let Ok(mut scratch) = Url::parse("http://segment.invalid/") else {
        return value.to_string();
    };
    if let Ok(mut segments) = scratch.path_segments_mut() {
        segments.clear().push(value);
    }
    scratch.path().trim_start_matches('/').to_string()
}

fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), param_string(v)))
        .collect()
}

/// Map a status and body to an observation.
fn process_response(status: u16, body: &str, max_length: usize) -> Result<String, InvokeFailure> {
    if status != 200 {
        return Err(InvokeFailure::Status {
            status,
            body: body.to_string(),
        });
    }

    if body.is_empty() {
        return Err(InvokeFailure::EmptyResponse);
    }

    if body.chars().count() < 10 && body.to_lowercase().contains("null") {
        return Err(InvokeFailure::EmptyResponse);
    }

    Ok(truncate_str(body, max_length))
}
