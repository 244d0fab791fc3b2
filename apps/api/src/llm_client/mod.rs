//! LLM Client: the single point of entry for all language-model backend calls.
//!
//! ARCHITECTURAL RULE: No other module may talk HTTP to the backend directly.
//! Extraction tiers depend on the `BackendClient` trait, never on `OllamaClient`.
//!
//! Every call builds a fresh, stateless request. No conversation context is
//! carried between calls, so one prompt's output can never bleed into the next.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod response;
#[cfg(test)]
pub mod testing;

use prompts::ISOLATION_SYSTEM;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("unexpected backend payload: {0}")]
    MalformedResponse(String),
}

/// Explicit timeout per cost class of backend call.
#[derive(Debug, Clone, Copy)]
pub struct BackendTimeouts {
    pub liveness: Duration,
    pub classification: Duration,
    pub experience: Duration,
    pub generation: Duration,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self {
            liveness: Duration::from_secs(5),
            classification: Duration::from_secs(300),
            experience: Duration::from_secs(1200),
            generation: Duration::from_secs(3600),
        }
    }
}

/// Sampling options forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.9,
            max_tokens: None,
        }
    }
}

/// One self-contained generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub model: String,
    pub options: GenerateOptions,
    pub timeout: Duration,
}

impl GenerateRequest {
    pub fn new(prompt: String, model: &str, timeout: Duration) -> Self {
        Self {
            prompt,
            model: model.to_string(),
            options: GenerateOptions::default(),
            timeout,
        }
    }
}

/// Outcome of a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub reachable: bool,
    pub model: Option<String>,
}

impl BackendStatus {
    pub fn reachable(model: String) -> Self {
        Self {
            reachable: true,
            model: Some(model),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            model: None,
        }
    }

    /// The model to use, present only when the backend is reachable.
    pub fn usable_model(&self) -> Option<&str> {
        if self.reachable {
            self.model.as_deref()
        } else {
            None
        }
    }
}

/// The backend seam. Implemented by `OllamaClient` in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Liveness check plus model resolution. Never fails: unreachability is a
    /// normal outcome reported through `BackendStatus`.
    async fn probe(&self) -> BackendStatus;

    /// Runs one generation call and returns the raw model text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Ollama wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl From<GenerateOptions> for OllamaOptions {
    fn from(options: GenerateOptions) -> Self {
        Self {
            temperature: options.temperature,
            top_p: options.top_p,
            num_predict: options.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    message: Option<ChatBodyMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatBodyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsBody {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    name: String,
}

// ────────────────────────────────────────────────────────────────────────────
// OllamaClient
// ────────────────────────────────────────────────────────────────────────────

/// HTTP client for an Ollama-compatible backend.
///
/// Cloning is cheap; each worker holds its own clone.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
    preferred_model: String,
    liveness_timeout: Duration,
}

impl OllamaClient {
    pub fn new(host: &str, preferred_model: &str, liveness_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            preferred_model: preferred_model.to_string(),
            liveness_timeout,
        }
    }

    async fn generate_single_shot(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let payload = GeneratePayload {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: request.options.into(),
        };
        let body = self
            .post_json(&format!("{}/api/generate", self.host), &payload, request.timeout)
            .await?;
        let parsed: GenerateBody = serde_json::from_str(&body)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        parsed.response.ok_or_else(|| {
            BackendError::MalformedResponse("generate body has no 'response' field".to_string())
        })
    }

    async fn generate_chat(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let payload = ChatPayload {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: ISOLATION_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            stream: false,
            options: request.options.into(),
        };
        let body = self
            .post_json(&format!("{}/api/chat", self.host), &payload, request.timeout)
            .await?;
        let parsed: ChatBody = serde_json::from_str(&body)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        parsed
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| {
                BackendError::MalformedResponse("chat body has no 'message.content'".to_string())
            })
    }

    async fn post_json<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl BackendClient for OllamaClient {
    async fn probe(&self) -> BackendStatus {
        let url = format!("{}/api/tags", self.host);
        let response = match self
            .client
            .get(&url)
            .timeout(self.liveness_timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(host = %self.host, error = %e, "Backend probe failed");
                return BackendStatus::unreachable();
            }
        };

        if !response.status().is_success() {
            warn!(host = %self.host, status = %response.status(), "Backend probe returned non-success");
            return BackendStatus::unreachable();
        }

        let tags: TagsBody = match response.json().await {
            Ok(t) => t,
            Err(e) => {
                warn!(host = %self.host, error = %e, "Backend probe returned an unreadable model list");
                return BackendStatus::unreachable();
            }
        };

        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        match select_model(&names, &self.preferred_model) {
            Some(model) => {
                debug!(model = %model, available = names.len(), "Backend reachable");
                BackendStatus::reachable(model)
            }
            None => {
                warn!(host = %self.host, "Backend lists no models");
                BackendStatus::unreachable()
            }
        }
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        match self.generate_single_shot(request).await {
            Err(BackendError::Status { status: 404, .. }) => {
                warn!(model = %request.model, "/api/generate returned 404, falling back to /api/chat");
                self.generate_chat(request).await
            }
            other => other,
        }
    }
}

fn map_transport_error(err: reqwest::Error, timeout: Duration) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(timeout)
    } else {
        BackendError::Unreachable(err.to_string())
    }
}

/// Picks the model to use from the listed names.
///
/// Priority: a name containing the preferred id, then one containing its family
/// prefix (`llama3.1` → `llama3`), then the first listed model.
pub fn select_model(names: &[String], preferred: &str) -> Option<String> {
    let preferred = preferred.to_lowercase();
    let family = preferred.split('.').next().unwrap_or(&preferred).to_string();

    let named = |needle: &str| {
        names
            .iter()
            .find(|n| !needle.is_empty() && n.to_lowercase().contains(needle))
            .cloned()
    };

    named(&preferred)
        .or_else(|| named(&family))
        .or_else(|| names.iter().find(|n| !n.is_empty()).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_model_prefers_exact_family_member() {
        let listed = names(&["mistral:7b", "llama3.1:8b", "llama3:70b"]);
        assert_eq!(select_model(&listed, "llama3.1").as_deref(), Some("llama3.1:8b"));
    }

    #[test]
    fn test_select_model_falls_back_to_family() {
        let listed = names(&["mistral:7b", "llama3:70b"]);
        assert_eq!(select_model(&listed, "llama3.1").as_deref(), Some("llama3:70b"));
    }

    #[test]
    fn test_select_model_falls_back_to_first() {
        let listed = names(&["mistral:7b", "qwen2:7b"]);
        assert_eq!(select_model(&listed, "llama3.1").as_deref(), Some("mistral:7b"));
    }

    #[test]
    fn test_select_model_empty_list() {
        assert_eq!(select_model(&[], "llama3.1"), None);
    }

    #[test]
    fn test_usable_model_requires_reachability() {
        let status = BackendStatus {
            reachable: false,
            model: Some("llama3.1".to_string()),
        };
        assert_eq!(status.usable_model(), None);
    }

    #[tokio::test]
    async fn test_probe_resolves_preferred_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "phi3:mini"}, {"name": "llama3.1:latest"}]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        let status = client.probe().await;
        assert_eq!(status, BackendStatus::reachable("llama3.1:latest".to_string()));
    }

    #[tokio::test]
    async fn test_probe_with_no_models_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        assert!(!client.probe().await.reachable);
    }

    #[tokio::test]
    async fn test_probe_server_error_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        assert_eq!(client.probe().await, BackendStatus::unreachable());
    }

    #[tokio::test]
    async fn test_probe_refused_connection_is_unreachable() {
        // Port 9 (discard) is not served in the test environment.
        let client = OllamaClient::new("http://127.0.0.1:9", "llama3.1", Duration::from_secs(1));
        assert!(!client.probe().await.reachable);
    }

    #[tokio::test]
    async fn test_generate_uses_single_shot_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3.1", "stream": false})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": "{\"skills\": []}"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        let request = GenerateRequest::new("prompt".to_string(), "llama3.1", Duration::from_secs(5));
        let text = client.generate(&request).await.unwrap();
        assert_eq!(text, "{\"skills\": []}");
    }

    #[tokio::test]
    async fn test_generate_falls_back_to_chat_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "NAVIGATE_TO_IT_SKILLS_EXTRACTION"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        let request = GenerateRequest::new("prompt".to_string(), "llama3.1", Duration::from_secs(5));
        let text = client.generate(&request).await.unwrap();
        assert_eq!(text, "NAVIGATE_TO_IT_SKILLS_EXTRACTION");
    }

    #[tokio::test]
    async fn test_generate_server_error_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        let request = GenerateRequest::new("prompt".to_string(), "llama3.1", Duration::from_secs(5));
        let err = client.generate(&request).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Status {
                status: 500,
                message: "model crashed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_timeout_is_reported_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        let request =
            GenerateRequest::new("prompt".to_string(), "llama3.1", Duration::from_millis(50));
        let err = client.generate(&request).await.unwrap_err();
        assert_eq!(err, BackendError::Timeout(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_generate_body_without_response_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "llama3.1", Duration::from_secs(5));
        let request = GenerateRequest::new("prompt".to_string(), "llama3.1", Duration::from_secs(5));
        assert!(matches!(
            client.generate(&request).await,
            Err(BackendError::MalformedResponse(_))
        ));
    }
}
