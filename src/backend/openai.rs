//! OpenAI chat-completions adapter.
//!
//! Requests `response_format = {"type": "json_object"}` so the model is
//! strongly biased toward bare JSON, but the normaliser still validates
//! everything — JSON mode guarantees syntax, not our schema.
//!
//! Also speaks to any OpenAI-compatible endpoint (vLLM, LM Studio, LiteLLM)
//! via [`OpenAiBackend::with_base_url`].

use crate::backend::GenerationBackend;
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::pipeline::prompt::GenerationRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Adapter for the OpenAI chat-completions API.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiBackend {
    /// Construct an adapter with an explicit API key.
    pub fn new(
        api_key: impl Into<String>,
        model: Option<&str>,
        config: &QuizConfig,
    ) -> Result<Self, QuizError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| QuizError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Construct an adapter reading `OPENAI_API_KEY` from the environment.
    pub fn from_env(model: Option<&str>, config: &QuizConfig) -> Result<Self, QuizError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| QuizError::BackendNotConfigured {
                backend: "openai".into(),
                hint: "Set OPENAI_API_KEY in the environment.".into(),
            })?;
        Self::new(api_key, model, config)
    }

    /// Point at an OpenAI-compatible endpoint instead of api.openai.com.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body<'a>(&'a self, request: &'a GenerationRequest, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, QuizError> {
        let url = format!("{}/chat/completions", self.base_url);
        let prompt = request.user_prompt();
        let body = self.build_body(request, &prompt);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuizError::Timeout {
                        backend: "openai".into(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }
                } else {
                    QuizError::Generation {
                        backend: "openai".into(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let detail = response.text().await.unwrap_or_default();
            return Err(QuizError::Auth {
                backend: "openai".into(),
                detail,
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(QuizError::RateLimited {
                backend: "openai".into(),
                retry_after_secs,
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(QuizError::Generation {
                backend: "openai".into(),
                detail: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| QuizError::Generation {
            backend: "openai".into(),
            detail: format!("unexpected response shape: {e}"),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| QuizError::Generation {
                backend: "openai".into(),
                detail: "response contained no choices".into(),
            })?;

        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = content.len(),
            "openai generation complete"
        );
        Ok(content)
    }
}
