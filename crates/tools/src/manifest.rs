//! Plugin manifest loading.
//!
//! A plugin is usually published as an ai-plugin description document
//! (`name_for_model`, `description_for_model`, `api.url`) whose `api.url`
//! points at an OpenAPI document. Both are fetched and flattened into a
//! [`PluginManifest`]: one [`Endpoint`] per operation that has an
//! `operationId`.
//!
//! Only JSON documents are understood. Parameters in `header` or `cookie`
//! position are dropped since the invoker never sends them.

use plugchain_config::PluginConfig;
use plugchain_core::error::PluginError;
use plugchain_core::plugin::{Endpoint, HttpMethod, ParamLocation, Parameter, PluginManifest};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP methods that may appear as keys of an OpenAPI path item.
const OPERATION_KEYS: [&str; 8] = ["get", "post", "put", "patch", "delete", "head", "options", "trace"];

/// Where a plugin description comes from.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    /// An ai-plugin document or a serialised manifest served over HTTP(S).
    Url(String),
    /// The same, read from disk.
    File(PathBuf),
    /// An already-built manifest.
    Inline(PluginManifest),
}

impl ManifestSource {
    /// Treat `http://` and `https://` references as URLs, anything else as a path.
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            Self::Url(reference.to_string())
        } else {
            Self::File(PathBuf::from(reference))
        }
    }
}

impl std::fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(manifest) => write!(f, "<inline {}>", manifest.name_for_model),
        }
    }
}

/// The ai-plugin description document.
#[derive(Debug, Deserialize)]
struct PluginDocument {
    name_for_model: String,
    #[serde(default)]
    description_for_model: String,
    api: ApiReference,
}

#[derive(Debug, Deserialize)]
struct ApiReference {
    url: String,
}

/// Where the document being processed was found, for resolving relative references.
enum Origin {
    Remote(Url),
    Local(PathBuf),
}

/// Fetches and normalises plugin descriptions.
///
/// Holds no state between loads apart from the HTTP connection pool.
pub struct ManifestLoader {
    client: reqwest::Client,
    timeout: Duration,
}

impl ManifestLoader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(Duration::from_secs(config.request_timeout_secs))
    }

    /// Load and validate the manifest behind `source`.
    pub async fn load(&self, source: &ManifestSource) -> Result<PluginManifest, PluginError> {
        let manifest = match source {
            ManifestSource::Inline(manifest) => manifest.clone(),
            ManifestSource::Url(url) => {
                let base = Url::parse(url).map_err(|e| PluginError::FetchFailed {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
                let text = self.fetch_text(&base).await?;
                let doc = parse_json(&text, PluginError::InvalidManifest)?;
                self.from_document(doc, Origin::Remote(base)).await?
            }
            ManifestSource::File(path) => {
                let text = read_text(path).await?;
                let doc = parse_json(&text, PluginError::InvalidManifest)?;
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                self.from_document(doc, Origin::Local(dir)).await?
            }
        };

        manifest.validate()?;
        info!(
            plugin = %manifest.name_for_model,
            endpoints = manifest.endpoints.len(),
            "Loaded plugin manifest"
        );
        Ok(manifest)
    }

    async fn from_document(&self, doc: Value, origin: Origin) -> Result<PluginManifest, PluginError> {
        if doc.get("api").is_none() {
            return serde_json::from_value(doc)
                .map_err(|e| PluginError::InvalidManifest(e.to_string()));
        }

        let plugin: PluginDocument =
            serde_json::from_value(doc).map_err(|e| PluginError::InvalidManifest(e.to_string()))?;

        let api_ref = plugin.api.url.as_str();
        let (spec_text, spec_origin) = if api_ref.starts_with("http://") || api_ref.starts_with("https://") {
            let url = Url::parse(api_ref).map_err(|e| PluginError::InvalidManifest(e.to_string()))?;
            (self.fetch_text(&url).await?, Some(url))
        } else {
            match origin {
                Origin::Remote(base) => {
                    let url = base
                        .join(api_ref)
                        .map_err(|e| PluginError::InvalidManifest(e.to_string()))?;
                    (self.fetch_text(&url).await?, Some(url))
                }
                Origin::Local(dir) => (read_text(&dir.join(api_ref)).await?, None),
            }
        };

        let spec = parse_json(&spec_text, PluginError::InvalidSpec)?;
        let endpoints = parse_openapi(&spec, spec_origin.as_ref())?;

        Ok(PluginManifest {
            name_for_model: plugin.name_for_model,
            description_for_model: plugin.description_for_model,
            endpoints,
        })
    }

    async fn fetch_text(&self, url: &Url) -> Result<String, PluginError> {
        debug!(url = %url, "Fetching plugin document");
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PluginError::FetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(PluginError::BadStatus {
                url: url.to_string(),
                status_code: status,
            });
        }

        response.text().await.map_err(|e| PluginError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::from_config(&PluginConfig::default())
    }
}

async fn read_text(path: &Path) -> Result<String, PluginError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PluginError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

fn parse_json(text: &str, wrap: fn(String) -> PluginError) -> Result<Value, PluginError> {
    serde_json::from_str(text).map_err(|e| {
        if text.trim_start().starts_with('{') {
            wrap(e.to_string())
        } else {
            wrap(format!("only JSON documents are supported ({e})"))
        }
    })
}

/// Flatten an OpenAPI document into endpoints, in declaration order.
///
/// `origin` is the URL the document was fetched from; it anchors relative
/// `servers` entries and stands in when `servers` is absent.
pub fn parse_openapi(spec: &Value, origin: Option<&Url>) -> Result<Vec<Endpoint>, PluginError> {
    let server = server_url(spec, origin)?;
    let paths = spec
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| PluginError::InvalidSpec("missing `paths` object".into()))?;

    let mut endpoints = Vec::new();
    for (route, item) in paths {
        let Some(item) = resolve_ref(spec, item).as_object() else {
            continue;
        };
        let shared = item.get("parameters");

        for (key, operation) in item {
            let method = key.to_ascii_lowercase();
            if !OPERATION_KEYS.contains(&method.as_str()) {
                continue;
            }
            let Some(operation_id) = operation.get("operationId").and_then(Value::as_str) else {
                debug!(route = %route, method = %method, "Skipping operation without operationId");
                continue;
            };

            let mut params: Vec<Parameter> = Vec::new();
            let declared = [shared, operation.get("parameters")];
            for raw in declared.into_iter().flatten().filter_map(Value::as_array).flatten() {
                if let Some(param) = parse_parameter(spec, raw) {
                    match params.iter_mut().find(|p| p.name == param.name) {
                        Some(existing) => *existing = param,
                        None => params.push(param),
                    }
                }
            }

            let summary = operation
                .get("summary")
                .or_else(|| operation.get("description"))
                .and_then(Value::as_str)
                .unwrap_or_default();

            endpoints.push(Endpoint {
                operation_id: operation_id.to_string(),
                method: HttpMethod::from(method.to_ascii_uppercase()),
                url: format!("{server}{route}"),
                params,
                payload: request_example(spec, operation),
                summary: summary.to_string(),
            });
        }
    }

    Ok(endpoints)
}

fn server_url(spec: &Value, origin: Option<&Url>) -> Result<String, PluginError> {
    let declared = spec
        .pointer("/servers/0/url")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());

    let url = match (declared, origin) {
        (Some(url), _) if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
        (Some(relative), Some(origin)) => origin
            .join(relative)
            .map_err(|e| PluginError::InvalidSpec(e.to_string()))?
            .to_string(),
        (None, Some(origin)) => origin.origin().ascii_serialization(),
        (_, None) => {
            return Err(PluginError::InvalidSpec(
                "cannot determine an absolute server URL".into(),
            ));
        }
    };

    Ok(url.trim_end_matches('/').to_string())
}

/// Follow local `$ref` pointers (`#/components/...`).
fn resolve_ref<'a>(spec: &'a Value, value: &'a Value) -> &'a Value {
    let mut current = value;
    for _ in 0..8 {
        let Some(pointer) = current
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix('#'))
        else {
            break;
        };
        match spec.pointer(pointer) {
            Some(target) => current = target,
            None => break,
        }
    }
    current
}

fn parse_parameter(spec: &Value, raw: &Value) -> Option<Parameter> {
    let raw = resolve_ref(spec, raw);
    let name = raw.get("name").and_then(Value::as_str)?;
    let location = match raw.get("in").and_then(Value::as_str)? {
        "path" => ParamLocation::Path,
        "query" => ParamLocation::Query,
        "body" => ParamLocation::Body,
        other => {
            debug!(param = %name, location = %other, "Skipping parameter");
            return None;
        }
    };

    Some(Parameter {
        name: name.to_string(),
        location,
        description: raw
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        schema: raw
            .get("schema")
            .map(|s| resolve_ref(spec, s).clone())
            .unwrap_or(Value::Null),
        required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Example JSON body of an operation: an explicit example if there is one,
/// otherwise the body schema itself.
fn request_example(spec: &Value, operation: &Value) -> Option<Value> {
    let body = resolve_ref(spec, operation.get("requestBody")?);
    let content = body.pointer("/content/application~1json")?;
    if let Some(example) = content.get("example") {
        return Some(example.clone());
    }
    let schema = resolve_ref(spec, content.get("schema")?);
    Some(schema.get("example").unwrap_or(schema).clone())
}
