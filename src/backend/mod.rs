//! Generation backends: the single capability the pipeline needs from a
//! generative-language service.
//!
//! Different backends expose different call shapes and wrapping conventions,
//! so each family gets one adapter behind the [`GenerationBackend`] trait.
//! The orchestrator depends only on the trait — it never inspects which
//! concrete backend it is driving, and tests inject a scripted
//! implementation the same way.
//!
//! Adapters make exactly one outbound HTTP call per `generate` invocation and
//! never retry internally; the bounded retry policy lives in the
//! orchestrator. Adapters also never interpret the response *content* — raw
//! text goes straight to the normaliser.
//!
//! ## Backend resolution
//!
//! [`resolve_backend`] picks a backend from most-specific to least-specific:
//!
//! 1. **Pre-built backend** (`config.backend`) — the caller constructed it;
//!    used as-is. This is how tests inject a mock.
//! 2. **Named backend** (`config.backend_name`) — e.g. `"openai"`; the
//!    matching API key is read from the environment.
//! 3. **Environment pair** (`PDF2QUIZ_BACKEND` + `PDF2QUIZ_MODEL`) — lets a
//!    deployment pick backend and model without touching code.
//! 4. **API-key auto-detection** — `OPENAI_API_KEY`, then `GEMINI_API_KEY`.

pub mod gemini;
pub mod openai;

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::pipeline::prompt::GenerationRequest;
use async_trait::async_trait;
use std::sync::Arc;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

/// The capability the pipeline needs: one request in, raw text out.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short backend name used in errors and logs ("openai", "gemini").
    fn name(&self) -> &str;

    /// Send the rendered request and return the model's raw textual output.
    ///
    /// The output is untrusted: it may contain fence markers or surrounding
    /// prose. Validation is the normaliser's job, not the adapter's.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, QuizError>;
}

impl std::fmt::Debug for dyn GenerationBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationBackend")
            .field("name", &self.name())
            .finish()
    }
}

/// Instantiate a named backend, reading its API key from the environment.
pub fn create_backend(
    name: &str,
    model: Option<&str>,
    config: &QuizConfig,
) -> Result<Arc<dyn GenerationBackend>, QuizError> {
    match name {
        "openai" => Ok(Arc::new(OpenAiBackend::from_env(model, config)?)),
        "gemini" => Ok(Arc::new(GeminiBackend::from_env(model, config)?)),
        other => Err(QuizError::BackendNotConfigured {
            backend: other.to_string(),
            hint: "Supported backends: openai, gemini".into(),
        }),
    }
}

/// Resolve the generation backend for this config (see module docs for the
/// fallback chain).
pub fn resolve_backend(config: &QuizConfig) -> Result<Arc<dyn GenerationBackend>, QuizError> {
    // 1) Caller-provided backend takes priority
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    // 2) Named backend
    if let Some(ref name) = config.backend_name {
        return create_backend(name, config.model.as_deref(), config);
    }

    // 3) Environment pair
    if let (Ok(name), Ok(model)) = (
        std::env::var("PDF2QUIZ_BACKEND"),
        std::env::var("PDF2QUIZ_MODEL"),
    ) {
        if !name.is_empty() && !model.is_empty() {
            return create_backend(&name, Some(&model), config);
        }
    }

    // 4) Auto-detect from API keys; OpenAI wins when both are present so
    // users with multiple keys get a predictable default.
    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_backend("openai", config.model.as_deref(), config);
    }
    if std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_backend("gemini", config.model.as_deref(), config);
    }

    Err(QuizError::BackendNotConfigured {
        backend: "auto".into(),
        hint: "No backend could be auto-detected from the environment.\n\
               Set OPENAI_API_KEY or GEMINI_API_KEY, or configure a backend explicitly."
            .into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_name_is_not_configured() {
        let config = QuizConfig::default();
        let err = create_backend("cobol-llm", None, &config).unwrap_err();
        match err {
            QuizError::BackendNotConfigured { backend, .. } => assert_eq!(backend, "cobol-llm"),
            other => panic!("expected BackendNotConfigured, got {other:?}"),
        }
    }

    #[test]
    fn injected_backend_wins_over_name() {
        struct Canned;

        #[async_trait]
        impl GenerationBackend for Canned {
            fn name(&self) -> &str {
                "canned"
            }
            async fn generate(&self, _request: &GenerationRequest) -> Result<String, QuizError> {
                Ok("{}".into())
            }
        }

        let config = QuizConfig::builder()
            .backend(Arc::new(Canned))
            .backend_name("openai")
            .build()
            .unwrap();
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.name(), "canned");
    }
}
