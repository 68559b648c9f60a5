//! Chat-completions client for any OpenAI-compatible endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{GeneratorError, PlanGenerator};

/// Default endpoint when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 120;

const SYSTEM_MESSAGE: &str =
    "You are a certified strength and conditioning coach. You answer with JSON only.";

/// Connection settings for the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Plan generator backed by `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl OpenAiCompatibleGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        if config.base_url.trim().is_empty() {
            return Err(GeneratorError::NotConfigured("base URL is empty".to_string()));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PlanGenerator for OpenAiCompatibleGenerator {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
        };

        let mut request = self.client.post(self.api_url("chat/completions")).json(&body);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "plan generator request failed");
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let content = extract_content(&text)?;
        debug!(chars = content.len(), "plan generator responded");
        Ok(content)
    }
}

/// Pull the first choice's message content out of a response body.
fn extract_content(body: &str) -> Result<String, GeneratorError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GeneratorError::InvalidResponse(format!("malformed JSON: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| GeneratorError::InvalidResponse("response has no content".to_string()))
}

/// `error.message` from an OpenAI-style error body, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn extract_content_takes_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"{\"weekly_plan\":[]}"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), r#"{"weekly_plan":[]}"#);
    }

    #[test]
    fn extract_content_rejects_empty_or_malformed() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
            "not json",
        ] {
            assert!(matches!(
                extract_content(body),
                Err(GeneratorError::InvalidResponse(_))
            ));
        }
    }

    #[test]
    fn error_message_prefers_structured_error() {
        assert_eq!(
            error_message(r#"{"error":{"message":"bad key","type":"auth"}}"#),
            "bad key"
        );
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn api_url_joins_without_double_slash() {
        let generator = OpenAiCompatibleGenerator::new(GeneratorConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..GeneratorConfig::default()
        })
        .unwrap();
        assert_eq!(
            generator.api_url("chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let result = OpenAiCompatibleGenerator::new(GeneratorConfig {
            base_url: " ".to_string(),
            ..GeneratorConfig::default()
        });
        assert!(matches!(result, Err(GeneratorError::NotConfigured(_))));
    }

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn generate_posts_prompt_with_bearer_key() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().unwrap().push((auth, body));
                        Json(json!({"choices": [{"message": {"content": "Monday – Legs"}}]}))
                    },
                ),
            )
            .with_state(seen.clone());
        let base_url = serve(router).await;

        let generator = OpenAiCompatibleGenerator::new(GeneratorConfig {
            base_url,
            model: "test-model".to_string(),
            api_key: Some("sk-test".to_string()),
        })
        .unwrap();

        let content = generator.generate("make me a plan").await.unwrap();
        assert_eq!(content, "Monday – Legs");

        let seen = seen.lock().unwrap();
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "make me a plan");
    }

    #[tokio::test]
    async fn generate_surfaces_api_errors() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "rate limited"}})),
                )
            }),
        );
        let base_url = serve(router).await;
        let generator = OpenAiCompatibleGenerator::new(GeneratorConfig {
            base_url,
            ..GeneratorConfig::default()
        })
        .unwrap();

        match generator.generate("plan").await {
            Err(GeneratorError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
