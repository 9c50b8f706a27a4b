//! Configuration for quiz generation.
//!
//! All pipeline behaviour is controlled through [`QuizConfig`], built via its
//! [`QuizConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share a config across requests (it is read-only after construction) and to
//! log the settings a run used.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor breaks on every new field. The builder lets callers
//! set only what they care about and rely on documented defaults for the rest.

use crate::backend::GenerationBackend;
use crate::error::QuizError;
use std::fmt;
use std::sync::Arc;

/// Configuration for a single quiz-generation pipeline.
///
/// Built via [`QuizConfig::builder()`] or [`QuizConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2quiz::QuizConfig;
///
/// let config = QuizConfig::builder()
///     .multiple_choice_count(3)
///     .true_false_count(2)
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// Number of multiple-choice questions to request. Default: 5.
    pub multiple_choice_count: usize,

    /// Number of true/false questions to request. Default: 5.
    pub true_false_count: usize,

    /// Maximum number of characters of extracted text embedded in the prompt.
    /// Default: 4000.
    ///
    /// This is a hard positional cut, not a summary: content beyond the budget
    /// is invisible to generation. The bound keeps the cost and latency of the
    /// backend call predictable regardless of document size.
    pub excerpt_limit: usize,

    /// Model identifier, e.g. "gpt-4o-mini" or "gemini-2.0-flash".
    /// If `None`, the backend's default model is used.
    pub model: Option<String>,

    /// Backend name ("openai", "gemini"). If `None` along with `backend`,
    /// the backend is auto-detected from API-key environment variables.
    pub backend_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over `backend_name`.
    /// This is how tests inject a mock.
    pub backend: Option<Arc<dyn GenerationBackend>>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low temperature keeps the model grounded in the excerpt rather than
    /// inventing material, which matters more for quizzes than variety does.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 2048.
    ///
    /// Ten questions with options fit comfortably; setting this too low
    /// truncates the JSON mid-object and shows up as a malformed response.
    pub max_tokens: usize,

    /// Retry attempts after the first generation+normalisation failure.
    /// Default: 2.
    ///
    /// Covers both transport errors (429/5xx/timeouts) and content errors
    /// (non-JSON or schema-violating output) — a fresh sample from the model
    /// usually fixes the latter. Auth errors are never retried.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call backend timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Ask the backend to suppress content-category safety filtering, where
    /// the backend supports it (Gemini). Default: false.
    ///
    /// Educational source material (history, biology) regularly trips
    /// category filters; this is a construction-time backend setting, not a
    /// per-call concern.
    pub disable_safety_filters: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            multiple_choice_count: 5,
            true_false_count: 5,
            excerpt_limit: 4000,
            model: None,
            backend_name: None,
            backend: None,
            temperature: 0.2,
            max_tokens: 2048,
            max_retries: 2,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            disable_safety_filters: false,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("multiple_choice_count", &self.multiple_choice_count)
            .field("true_false_count", &self.true_false_count)
            .field("excerpt_limit", &self.excerpt_limit)
            .field("model", &self.model)
            .field("backend_name", &self.backend_name)
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("disable_safety_filters", &self.disable_safety_filters)
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`QuizConfig`].
#[derive(Debug)]
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn multiple_choice_count(mut self, n: usize) -> Self {
        self.config.multiple_choice_count = n;
        self
    }

    pub fn true_false_count(mut self, n: usize) -> Self {
        self.config.true_false_count = n;
        self
    }

    pub fn excerpt_limit(mut self, chars: usize) -> Self {
        self.config.excerpt_limit = chars.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn backend_name(mut self, name: impl Into<String>) -> Self {
        self.config.backend_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    /// Clamped to at most 10; beyond that the exponential backoff dwarfs any
    /// realistic request deadline.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(10);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn disable_safety_filters(mut self, v: bool) -> Self {
        self.config.disable_safety_filters = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizError> {
        let c = &self.config;
        if c.multiple_choice_count + c.true_false_count == 0 {
            return Err(QuizError::InvalidConfig(
                "At least one question must be requested".into(),
            ));
        }
        if c.multiple_choice_count > 50 || c.true_false_count > 50 {
            return Err(QuizError::InvalidConfig(format!(
                "Question counts must be ≤ 50, got {} MCQ / {} TF",
                c.multiple_choice_count, c.true_false_count
            )));
        }
        if c.excerpt_limit == 0 {
            return Err(QuizError::InvalidConfig(
                "Excerpt limit must be ≥ 1 character".into(),
            ));
        }
        Ok(self.config)
    }
}
