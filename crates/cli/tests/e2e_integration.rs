//! End-to-end integration tests for plugchain.
//!
//! These tests exercise the full pipeline from a published plugin to a
//! finished turn: manifest loading, compilation, prompt assembly, action
//! parsing, tool resolution and HTTP invocation against a mock API.

use std::sync::Mutex;

use plugchain_agent::{ChatSession, SharedTokenizer, TextGenerator, resolve};
use plugchain_config::AppConfig;
use plugchain_core::error::GenerationError;
use plugchain_tools::{ManifestSource, PluginCompiler};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Scripted Generator ───────────────────────────────────────────────────

/// A generator that returns scripted completions in sequence.
struct ScriptedGenerator {
    outputs: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(outputs: &[&str]) -> Self {
        Self {
            outputs: Mutex::new(outputs.iter().rev().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, stop: &[String]) -> Result<String, GenerationError> {
        assert_eq!(stop.to_vec(), vec!["Observation:".to_string()]);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outputs
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| GenerationError::Failed("script exhausted".into()))
    }
}

// ── Mock Plugin ──────────────────────────────────────────────────────────

async fn weather_plugin() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/ai-plugin.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schema_version": "v1",
            "name_for_model": "weather",
            "description_for_model": "Weather forecasts and alerts.",
            "api": {"type": "openapi", "url": "/openapi.json"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "openapi": "3.0.1",
            "paths": {
                "/weather": {
                    "get": {
                        "operationId": "get_weather",
                        "summary": "Current weather for a city",
                        "parameters": [{
                            "name": "city", "in": "query", "required": true,
                            "description": "City name",
                            "schema": {"type": "string"}
                        }]
                    }
                },
                "/alerts": {
                    "post": {
                        "operationId": "create_alert",
                        "summary": "Subscribe to alerts",
                        "requestBody": {"content": {"application/json": {
                            "schema": {"type": "object", "example": {"city": "Paris", "level": "red"}}
                        }}}
                    }
                }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"temp": 21, "sky": "clear"}"#))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_json(json!({"city": "Lyon", "level": "red"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("subscribed"))
        .mount(&server)
        .await;

    server
}

fn plugin_source(server: &MockServer) -> ManifestSource {
    ManifestSource::Url(format!("{}/.well-known/ai-plugin.json", server.uri()))
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn compile_published_plugin() {
    let server = weather_plugin().await;
    let config = AppConfig::default();
    let compiler = PluginCompiler::new(&config.plugin, &config.chain);

    let compiled = compiler.compile(&plugin_source(&server)).await;

    assert_eq!(compiled.tools.names(), vec!["get_weather", "create_alert"]);
    assert!(compiled.description.contains("weather plugin description:\nWeather forecasts and alerts."));
    assert!(compiled.description.contains("tool description: Current weather for a city"));
    assert!(compiled.description.contains("\"level\": \"red\""));
}

#[tokio::test]
async fn full_turn_with_tool_call() {
    let server = weather_plugin().await;
    let mut session =
        ChatSession::new(AppConfig::default(), SharedTokenizer::heuristic()).with_plugin(plugin_source(&server));
    let generator = ScriptedGenerator::new(&[
        "Thought: Do I need to use a tool? Yes\nAction: get_weather\nAction Input:\n{\"city\": \"Paris\"}",
        "Thought: Do I need to use a tool? No\nFinal Answer: It is 21 degrees and clear in Paris.",
    ]);

    let outcome = session.turn("What's the weather in Paris?", &generator).await.unwrap();

    assert_eq!(outcome.answer, "It is 21 degrees and clear in Paris.");
    assert!(!outcome.exhausted);
    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.steps[0].observation, r#"{"temp": 21, "sky": "clear"}"#);

    let prompts = generator.prompts();
    assert!(prompts[0].contains("Tool names: get_weather, create_alert"));
    assert!(prompts[1].contains(r#"Observation: {"temp": 21, "sky": "clear"}"#));
    assert_eq!(
        session.memory().buffer(),
        "Human: What's the weather in Paris?\nAssistant: It is 21 degrees and clear in Paris."
    );
}

#[tokio::test]
async fn post_payload_through_session() {
    let server = weather_plugin().await;
    let mut session =
        ChatSession::new(AppConfig::default(), SharedTokenizer::heuristic()).with_plugin(plugin_source(&server));
    let generator = ScriptedGenerator::new(&[
        "Action: create_alert\nAction Input: {\"payload\": {\"city\": \"Lyon\", \"level\": \"red\"}}",
        "Final Answer: Subscribed.",
    ]);

    let outcome = session.turn("Alert me about Lyon", &generator).await.unwrap();

    assert_eq!(outcome.steps[0].observation, "subscribed");
    assert_eq!(outcome.answer, "Subscribed.");
}

#[tokio::test]
async fn failed_call_is_fed_back_to_model() {
    let server = weather_plugin().await;
    let mut session =
        ChatSession::new(AppConfig::default(), SharedTokenizer::heuristic()).with_plugin(plugin_source(&server));
    let generator = ScriptedGenerator::new(&[
        "Action: get_weather\nAction Input: {\"city\": \"Atlantis\"}",
        "Final Answer: I could not find that city.",
    ]);

    let outcome = session.turn("Weather in Atlantis?", &generator).await.unwrap();

    let observation = &outcome.steps[0].observation;
    assert!(observation.starts_with("ERROR! That didn't work, try modifying Action Input."));
    assert!(observation.contains("Status 404"));
    assert!(generator.prompts()[1].contains("Status 404"));
}

#[tokio::test]
async fn unreachable_plugin_falls_back_to_chat() {
    let mut session = ChatSession::new(AppConfig::default(), SharedTokenizer::heuristic())
        .with_plugin(ManifestSource::Url("http://127.0.0.1:1/.well-known/ai-plugin.json".into()));
    let generator = ScriptedGenerator::new(&["Final Answer: Hello there."]);

    let outcome = session.turn("Hello", &generator).await.unwrap();

    assert_eq!(outcome.answer, "Hello there.");
    let prompt = &generator.prompts()[0];
    assert!(!prompt.contains("TOOLS:"));
    assert!(prompt.ends_with("Human: Hello\nAssistant:"));
}

#[tokio::test]
async fn approximate_name_calls_the_right_endpoint() {
    let server = weather_plugin().await;
    let config = AppConfig::default();
    let compiled = PluginCompiler::new(&config.plugin, &config.chain)
        .compile(&plugin_source(&server))
        .await;

    let tool = resolve("get_whether", &compiled.tools).unwrap();
    let observation = tool.call("{\"city\": \"Paris\"}").await;

    assert_eq!(tool.name(), "get_weather");
    assert!(observation.contains("\"temp\": 21"));
}
