//! Request construction: extracted text + question counts to an immutable
//! [`GenerationRequest`].
//!
//! This stage is a pure function — no I/O, no failure path. The excerpt is
//! truncated to a fixed character budget before it is embedded: the cut is
//! positional, not semantic, so content past the budget is simply invisible
//! to generation. That is a documented cost/latency bound, not a bug.

use crate::config::QuizConfig;
use crate::prompts;

/// An immutable, fully rendered generation request.
///
/// Every backend receives the same instruction text; the schema contract is
/// carried in the prompt itself so backends are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// System persona for the backend.
    pub system: String,
    /// The (possibly truncated) document excerpt.
    pub excerpt: String,
    pub multiple_choice_count: usize,
    pub true_false_count: usize,
}

impl GenerationRequest {
    /// The rendered user message: instructions, excerpt, and the literal
    /// schema description with a worked example.
    pub fn user_prompt(&self) -> String {
        prompts::quiz_prompt(
            &self.excerpt,
            self.multiple_choice_count,
            self.true_false_count,
        )
    }
}

/// Build a [`GenerationRequest`] from extracted text and the configured counts.
pub fn build_request(text: &str, config: &QuizConfig) -> GenerationRequest {
    GenerationRequest {
        system: prompts::SYSTEM_PROMPT.to_string(),
        excerpt: truncate_chars(text, config.excerpt_limit),
        multiple_choice_count: config.multiple_choice_count,
        true_false_count: config.true_false_count,
    }
}

/// Keep exactly the first `limit` characters of `text`.
///
/// Counts characters, not bytes, so a multi-byte code point at the boundary
/// is kept or dropped whole rather than split.
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
