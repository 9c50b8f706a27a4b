//! Pipeline stages for PDF-to-quiz generation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. a different extraction crate) without touching the
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prompt ──▶ backend ──▶ normalize
//! (PDF→text)  (request)  (LLM call)  (JSON→Quiz)
//! ```
//!
//! 1. [`extract`]   — PDF bytes to plain text; runs in `spawn_blocking`
//!    because PDF parsing is CPU-bound
//! 2. [`prompt`]    — pure rendering of text + counts into a
//!    [`prompt::GenerationRequest`]; cannot fail, performs no I/O
//! 3. [`crate::backend`] — drives the generation call; the only stage with
//!    network I/O
//! 4. [`normalize`] — strips fence wrapping, parses, and validates the raw
//!    model output into a [`crate::Quiz`]
pub mod extract;
pub mod normalize;
pub mod prompt;
