//! Error types for the pdf2quiz library.
//!
//! A single [`QuizError`] enum covers every way a request can fail, but the
//! variants fall into three behavioural groups that callers care about:
//!
//! * **Client-input failures** (bad PDF, no extractable text) — deterministic,
//!   never retried, the uploader must fix the document.
//! * **Backend failures** (unreachable API, garbage model output) — transient,
//!   eligible for the pipeline's bounded retry; see [`QuizError::is_retryable`].
//! * **Internal failures** (misconfiguration, runtime errors) — bugs or setup
//!   problems on our side.
//!
//! [`QuizError::kind`] exposes the group so a transport layer can map it to a
//! status code, and [`QuizError::public_message`] gives a stable, generic
//! message that leaks no backend internals. Raw model output and API error
//! bodies go to logs only.

use serde::Serialize;
use thiserror::Error;

/// All errors returned by the pdf2quiz library.
#[derive(Debug, Error)]
pub enum QuizError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The uploaded bytes do not parse as a PDF document.
    #[error("Failed to parse PDF: {detail}")]
    Extraction { detail: String },

    /// The PDF parsed, but no text could be extracted (e.g. scanned pages).
    #[error("PDF parsed but contained no extractable text")]
    EmptyContent,

    // ── Backend errors ────────────────────────────────────────────────────
    /// The generation backend could not be reached or returned a server error.
    #[error("Generation backend '{backend}' failed: {detail}")]
    Generation { backend: String, detail: String },

    /// The backend rejected our credentials (401/403) — retry will not help.
    #[error("Authentication failed for backend '{backend}': {detail}")]
    Auth { backend: String, detail: String },

    /// The backend returned HTTP 429.
    ///
    /// Check `retry_after_secs` for a server-specified delay, or use
    /// exponential backoff if `None`.
    #[error("Rate limit exceeded for backend '{backend}'")]
    RateLimited {
        backend: String,
        retry_after_secs: Option<u64>,
    },

    /// The generation call exceeded the configured timeout.
    #[error("Generation call timed out after {elapsed_ms}ms on backend '{backend}'")]
    Timeout { backend: String, elapsed_ms: u64 },

    /// No usable backend could be constructed (missing API key etc.).
    #[error("Generation backend '{backend}' is not configured.\n{hint}")]
    BackendNotConfigured { backend: String, hint: String },

    // ── Response errors ───────────────────────────────────────────────────
    /// The model output was not parseable as JSON, even after unwrapping a
    /// fenced block. The raw output is logged, never carried here.
    #[error("Model output was not valid JSON: {detail}")]
    MalformedResponse { detail: String },

    /// The model output parsed as JSON but violated the quiz schema.
    ///
    /// `detail` names the offending section, index, and field, e.g.
    /// `multiple_choice[2].options: expected exactly 4 options, got 3`.
    #[error("Model output violates the quiz schema: {detail}")]
    SchemaViolation { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification a transport layer maps to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller's document is at fault (HTTP 400 territory).
    ClientInput,
    /// The generation backend failed us (HTTP 502 territory).
    BackendFailure,
    /// Our own configuration or runtime failed (HTTP 500 territory).
    Internal,
}

/// The externally visible error body: `{ "error": "<message>" }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl QuizError {
    /// Which behavioural group this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::Extraction { .. } | QuizError::EmptyContent => ErrorKind::ClientInput,
            QuizError::Generation { .. }
            | QuizError::Auth { .. }
            | QuizError::RateLimited { .. }
            | QuizError::Timeout { .. }
            | QuizError::MalformedResponse { .. }
            | QuizError::SchemaViolation { .. } => ErrorKind::BackendFailure,
            QuizError::BackendNotConfigured { .. }
            | QuizError::InvalidConfig(_)
            | QuizError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the pipeline may re-issue the generation call for this error.
    ///
    /// Extraction failures are deterministic and auth failures are permanent;
    /// everything between "network blip" and "model emitted garbage" is worth
    /// one more attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuizError::Generation { .. }
                | QuizError::RateLimited { .. }
                | QuizError::Timeout { .. }
                | QuizError::MalformedResponse { .. }
                | QuizError::SchemaViolation { .. }
        )
    }

    /// Stable, generic message safe to return to the caller.
    ///
    /// Internal detail (API error bodies, raw model output, parse positions)
    /// stays in the `Display` impl and the logs.
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ClientInput => match self {
                QuizError::EmptyContent => "Could not extract any text from the PDF.",
                _ => "The uploaded file could not be read as a PDF.",
            },
            ErrorKind::BackendFailure => "Failed to generate a quiz from the document.",
            ErrorKind::Internal => "An internal error occurred.",
        }
    }

    /// The `{ "error": ... }` object the transport layer serialises.
    pub fn to_public_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.public_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_client_input_and_not_retryable() {
        let e = QuizError::Extraction {
            detail: "missing %PDF header".into(),
        };
        assert_eq!(e.kind(), ErrorKind::ClientInput);
        assert!(!e.is_retryable());
    }

    #[test]
    fn empty_content_has_distinct_public_message() {
        let empty = QuizError::EmptyContent;
        let parse = QuizError::Extraction {
            detail: "corrupt xref".into(),
        };
        assert_ne!(empty.public_message(), parse.public_message());
    }

    #[test]
    fn schema_violation_is_retryable_backend_failure() {
        let e = QuizError::SchemaViolation {
            detail: "multiple_choice[0].options: expected exactly 4 options, got 3".into(),
        };
        assert_eq!(e.kind(), ErrorKind::BackendFailure);
        assert!(e.is_retryable());
    }

    #[test]
    fn auth_is_not_retryable() {
        let e = QuizError::Auth {
            backend: "openai".into(),
            detail: "invalid key".into(),
        };
        assert!(!e.is_retryable());
        assert!(e.to_string().contains("openai"));
    }

    #[test]
    fn public_body_hides_internal_detail() {
        let e = QuizError::Generation {
            backend: "gemini".into(),
            detail: "HTTP 503: upstream exploded at 10.0.0.3".into(),
        };
        let body = serde_json::to_string(&e.to_public_body()).unwrap();
        assert!(body.contains("\"error\""));
        assert!(!body.contains("10.0.0.3"));
    }

    #[test]
    fn rate_limit_display_with_and_without_retry_after() {
        let with = QuizError::RateLimited {
            backend: "openai".into(),
            retry_after_secs: Some(30),
        };
        let without = QuizError::RateLimited {
            backend: "gemini".into(),
            retry_after_secs: None,
        };
        assert!(with.to_string().contains("openai"));
        assert!(without.to_string().contains("gemini"));
    }
}
