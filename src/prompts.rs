//! Prompt text for quiz generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the instruction text and the literal schema
//!    description must stay in lockstep with what the response normaliser
//!    validates; editing them in one place keeps them aligned.
//!
//! 2. **Testability** — unit tests can inspect the rendered prompt directly
//!    without calling a real backend, so schema-description regressions are
//!    caught cheaply.
//!
//! The same rendered text is sent to every backend: the schema contract lives
//! in the prompt, not in backend-specific request options, so any compliant
//! backend can be instructed identically.

/// System persona sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are an expert quiz creator for educators.";

/// Render the user-facing instruction text for a document excerpt.
///
/// Embeds the exact question counts and a literal description of the required
/// JSON shape, including a worked example. The example matters: models follow
/// a concrete sample far more reliably than a prose schema description alone.
pub fn quiz_prompt(excerpt: &str, multiple_choice: usize, true_false: usize) -> String {
    format!(
        r#"Based on the following text, please generate a quiz. The quiz should contain {multiple_choice} multiple-choice questions and {true_false} true/false questions.

The text is as follows:
---
{excerpt}
---

Please format the output as a single JSON object with two keys: "multiple_choice" and "true_false".
- Each element in the "multiple_choice" array should be an object with "question", "options" (an array of 4 distinct strings), and "answer" (the correct option string).
- Each element in the "true_false" array should be an object with "question" and "answer" (either "True" or "False").

Example of the required JSON format:
{{
  "multiple_choice": [
    {{
      "question": "What is the capital of France?",
      "options": ["London", "Berlin", "Paris", "Madrid"],
      "answer": "Paris"
    }}
  ],
  "true_false": [
    {{
      "question": "The sky is blue.",
      "answer": "True"
    }}
  ]
}}

Respond with the JSON object only."#
    )
}
