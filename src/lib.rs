//! # pdf2quiz
//!
//! Generate a structured quiz from a PDF document using a generative-language
//! backend.
//!
//! ## Why this crate?
//!
//! Turning a free-form model response into something an application can trust
//! is the hard part of this job. The model is not contractually bound to emit
//! bare JSON — it wraps output in code fences, prepends pleasantries, drops
//! an option from a question, or refuses outright. This crate owns that gap:
//! it extracts the document text, instructs the backend with an exact schema,
//! then validates every invariant of the response before a [`Quiz`] ever
//! reaches the caller, retrying the generation when the output is unusable.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Extract    PDF → plain text (spawn_blocking, CPU-bound)
//!  ├─ 2. Prompt     text + counts → GenerationRequest (pure, truncated excerpt)
//!  ├─ 3. Generate   one backend call (openai / gemini / injected)
//!  ├─ 4. Normalize  strip fences → parse JSON → validate schema
//!  └─ 5. Output     validated Quiz  (steps 3–4 retried together on failure)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2quiz::{generate_quiz, QuizConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backend auto-detected from OPENAI_API_KEY / GEMINI_API_KEY
//!     let bytes = std::fs::read("chapter.pdf")?;
//!     let config = QuizConfig::default();
//!     let quiz = generate_quiz(&bytes, &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&quiz)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2quiz` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2quiz = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod prompts;
pub mod quiz;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{GeminiBackend, GenerationBackend, OpenAiBackend};
pub use config::{QuizConfig, QuizConfigBuilder};
pub use error::{ErrorBody, ErrorKind, QuizError};
pub use generate::{generate_quiz, generate_quiz_sync};
pub use pipeline::prompt::GenerationRequest;
pub use quiz::{MultipleChoiceQuestion, Quiz, TrueFalseQuestion};
