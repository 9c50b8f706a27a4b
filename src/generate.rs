//! The quiz pipeline: orchestrates extraction, prompting, generation, and
//! normalisation for one document.
//!
//! ## Stage progression
//!
//! A request moves strictly forward through
//! `extract → prompt → generate → normalize`, terminating in either a
//! validated [`Quiz`] or a single [`QuizError`]; there is no branching back
//! except the one controlled retry described below. Nothing is cached or
//! shared between requests — concurrent invocations are fully independent,
//! and the only shared resource (the backend's HTTP client and credentials)
//! is read-only after construction.
//!
//! ## Retry Strategy
//!
//! Extraction and prompt-building are deterministic, so their failures are
//! final. The generation+normalisation pair is retried together up to
//! `max_retries` extra times with exponential backoff
//! (`retry_backoff_ms * 2^attempt`): a fresh sample fixes transient HTTP
//! errors *and* most malformed or schema-violating model output. With the
//! 500 ms default base and 2 retries the wait sequence is 500 ms → 1 s,
//! under 2 s of total back-off per request.
//!
//! If the caller drops the returned future mid-flight, the in-flight backend
//! call is cancelled with it; nothing keeps running in the background.

use crate::backend;
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::pipeline::{extract, normalize, prompt};
use crate::quiz::Quiz;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Generate a quiz from an in-memory PDF document.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `pdf_bytes` — Raw bytes of the uploaded PDF
/// * `config` — Pipeline configuration (counts, backend, retry policy)
///
/// # Errors
/// * [`QuizError::Extraction`] / [`QuizError::EmptyContent`] — the document
///   is at fault; no backend call is made
/// * [`QuizError::BackendNotConfigured`] — no backend available
/// * Any retryable backend/content error, surfaced after the bounded retry
///   is exhausted
pub async fn generate_quiz(pdf_bytes: &[u8], config: &QuizConfig) -> Result<Quiz, QuizError> {
    let total_start = Instant::now();
    info!(bytes = pdf_bytes.len(), "starting quiz generation");

    // ── Step 1: Extract text ─────────────────────────────────────────────
    // Fails here (including on empty content) before any network traffic.
    let text = extract::extract_text(pdf_bytes).await?;

    // ── Step 2: Build the generation request ─────────────────────────────
    let request = prompt::build_request(&text, config);
    debug!(
        excerpt_chars = request.excerpt.chars().count(),
        mcq = request.multiple_choice_count,
        tf = request.true_false_count,
        "built generation request"
    );

    // ── Step 3: Resolve the backend ──────────────────────────────────────
    let backend = backend::resolve_backend(config)?;
    debug!(backend = backend.name(), "resolved generation backend");

    // ── Step 4: Generate + normalise, with bounded retry ─────────────────
    let mut last_err: Option<QuizError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                attempt,
                max_retries = config.max_retries,
                backoff_ms = backoff,
                "retrying generation"
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let raw = match backend.generate(&request).await {
            Ok(raw) => raw,
            Err(e) if e.is_retryable() => {
                warn!(backend = backend.name(), error = %e, "generation attempt failed");
                last_err = Some(e);
                continue;
            }
            Err(e) => return Err(e),
        };

        match normalize::normalize(&raw) {
            Ok(quiz) => {
                info!(
                    questions = quiz.question_count(),
                    retries = attempt,
                    elapsed_ms = total_start.elapsed().as_millis() as u64,
                    "quiz generation complete"
                );
                return Ok(quiz);
            }
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "model output rejected");
                last_err = Some(e);
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err
        .unwrap_or_else(|| QuizError::Internal("retry loop exhausted without an error".into())))
}

/// Delay before retry `attempt` (1-based): exponential from the configured
/// base. The config fields are public, so the doubling is capped and the
/// multiply saturates rather than overflowing on absurd retry counts.
fn backoff_ms(base_ms: u64, attempt: u32) -> u64 {
    let exp = (attempt - 1).min(10);
    base_ms.saturating_mul(1u64 << exp)
}

/// Synchronous wrapper around [`generate_quiz`].
///
/// Creates a temporary tokio runtime internally. Use this from non-async
/// callers; inside an async context call [`generate_quiz`] directly.
pub fn generate_quiz_sync(pdf_bytes: &[u8], config: &QuizConfig) -> Result<Quiz, QuizError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuizError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(generate_quiz(pdf_bytes, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerationBackend;
    use crate::pipeline::prompt::GenerationRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingBackend {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GenerationBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, QuizError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("not json".into())
        }
    }

    #[tokio::test]
    async fn bad_pdf_fails_before_any_backend_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = QuizConfig::builder()
            .backend(Arc::new(CountingBackend {
                calls: Arc::clone(&calls),
            }))
            .build()
            .unwrap();

        let err = generate_quiz(b"not a pdf", &config).await.unwrap_err();
        assert!(matches!(err, QuizError::Extraction { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_input_fails_as_extraction_error() {
        let err = generate_quiz(b"", &QuizConfig::default()).await.unwrap_err();
        assert!(matches!(err, QuizError::Extraction { .. }));
    }

    #[test]
    fn backoff_doubles_from_the_base() {
        assert_eq!(backoff_ms(500, 1), 500);
        assert_eq!(backoff_ms(500, 2), 1000);
        assert_eq!(backoff_ms(500, 3), 2000);
    }

    #[test]
    fn backoff_never_overflows_on_huge_attempt_counts() {
        assert_eq!(backoff_ms(500, 100), 500 * 1024);
        assert_eq!(backoff_ms(u64::MAX, u32::MAX), u64::MAX);
    }

    // Retry-count behaviour needs a real text-bearing PDF and lives in the
    // integration suite (tests/pipeline.rs) alongside the scenario tests.
    #[test]
    fn counting_backend_is_object_safe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let b: Arc<dyn GenerationBackend> = Arc::new(CountingBackend { calls });
        assert_eq!(b.name(), "counting");
    }
}
