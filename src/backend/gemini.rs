//! Google Gemini `generateContent` adapter.
//!
//! Sets `responseMimeType: application/json` to bias the model toward bare
//! JSON output. When the config asks for it, every harm-category safety
//! filter is set to `BLOCK_NONE` at construction time — educational source
//! material (wars, diseases, court cases) regularly trips category filters
//! and an empty candidate list is indistinguishable from a server fault.

use crate::backend::GenerationBackend;
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::pipeline::prompt::GenerationRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Adapter for the Gemini REST API.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: usize,
    disable_safety_filters: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
    response_mime_type: &'static str,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiBackend {
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
            disable_safety_filters: config.disable_safety_filters,
        })
    }

    /// Construct an adapter reading `GEMINI_API_KEY` from the environment.
    pub fn from_env(model: Option<&str>, config: &QuizConfig) -> Result<Self, QuizError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| QuizError::BackendNotConfigured {
                backend: "gemini".into(),
                hint: "Set GEMINI_API_KEY in the environment.".into(),
            })?;
        Self::new(api_key, model, config)
    }

    /// Point at a different API host (proxies, regional endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body<'a>(
        &'a self,
        request: &'a GenerationRequest,
        prompt: &'a str,
    ) -> GenerateContentRequest<'a> {
        let safety_settings = if self.disable_safety_filters {
            HARM_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect()
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
                response_mime_type: "application/json",
            },
            safety_settings,
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, QuizError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let prompt = request.user_prompt();
        let body = self.build_body(request, &prompt);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuizError::Timeout {
                        backend: "gemini".into(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }
                } else {
                    QuizError::Generation {
                        backend: "gemini".into(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let detail = response.text().await.unwrap_or_default();
            return Err(QuizError::Auth {
                backend: "gemini".into(),
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
                backend: "gemini".into(),
                retry_after_secs,
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(QuizError::Generation {
                backend: "gemini".into(),
                detail: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| QuizError::Generation {
                backend: "gemini".into(),
                detail: format!("unexpected response shape: {e}"),
            })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| QuizError::Generation {
                backend: "gemini".into(),
                detail: "response contained no candidates (possibly safety-filtered)".into(),
            })?;

        let content: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = content.len(),
            "gemini generation complete"
        );
        Ok(content)
    }
}
