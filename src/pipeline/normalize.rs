//! Response normalisation: untrusted model output to a validated [`Quiz`].
//!
//! This is the most failure-prone stage — the backend is not contractually
//! bound to emit bare JSON. Models wrap output in ```json fences, prepend
//! pleasantries, or return outright refusals. Normalisation is therefore two
//! steps with distinct failure modes:
//!
//! 1. **Unwrap** — best-effort: if a fenced block tagged `json` exists, its
//!    content becomes the parse candidate; otherwise the whole text does.
//!    Unwrapping success proves nothing, which is why step 2 always runs.
//! 2. **Validate** — strict: parse as JSON, then check every schema invariant.
//!    A single malformed entry rejects the whole response — a partially
//!    trusted quiz is worse than a clear failure the pipeline can retry.
//!
//! The raw output is logged at debug level on parse failure and never
//! surfaces to the caller.

use crate::error::QuizError;
use crate::quiz::{MultipleChoiceQuestion, Quiz, TrueFalseQuestion};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Number of options every multiple-choice question must carry.
const OPTION_COUNT: usize = 4;

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap());

/// Normalise raw model output into a validated [`Quiz`].
///
/// Pure and deterministic: the same input always yields a structurally
/// identical result, so the orchestrator can re-run it freely.
pub fn normalize(raw: &str) -> Result<Quiz, QuizError> {
    let candidate = extract_json_candidate(raw);

    let value: Value = serde_json::from_str(candidate.trim()).map_err(|e| {
        debug!(raw_output = raw, "model output failed JSON parse");
        QuizError::MalformedResponse {
            detail: e.to_string(),
        }
    })?;

    validate_quiz(&value)
}

/// Pick the parse candidate: the content of a ```json fenced block if one
/// exists, otherwise the whole raw text.
fn extract_json_candidate(raw: &str) -> &str {
    RE_JSON_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
}

fn schema(detail: impl Into<String>) -> QuizError {
    QuizError::SchemaViolation {
        detail: detail.into(),
    }
}

/// Validate the top-level shape and every entry, preserving order.
fn validate_quiz(value: &Value) -> Result<Quiz, QuizError> {
    let obj = value
        .as_object()
        .ok_or_else(|| schema("top-level value is not an object"))?;

    let mcq_entries = obj
        .get("multiple_choice")
        .ok_or_else(|| schema("missing key 'multiple_choice'"))?
        .as_array()
        .ok_or_else(|| schema("'multiple_choice' is not an array"))?;

    let tf_entries = obj
        .get("true_false")
        .ok_or_else(|| schema("missing key 'true_false'"))?
        .as_array()
        .ok_or_else(|| schema("'true_false' is not an array"))?;

    let multiple_choice = mcq_entries
        .iter()
        .enumerate()
        .map(|(i, v)| validate_multiple_choice(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    let true_false = tf_entries
        .iter()
        .enumerate()
        .map(|(i, v)| validate_true_false(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Quiz {
        multiple_choice,
        true_false,
    })
}

fn validate_multiple_choice(index: usize, value: &Value) -> Result<MultipleChoiceQuestion, QuizError> {
    let obj = value
        .as_object()
        .ok_or_else(|| schema(format!("multiple_choice[{index}] is not an object")))?;

    let question = non_empty_string(obj.get("question"))
        .ok_or_else(|| schema(format!("multiple_choice[{index}].question: expected a non-empty string")))?;

    let raw_options = obj
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| schema(format!("multiple_choice[{index}].options: expected an array")))?;

    if raw_options.len() != OPTION_COUNT {
        return Err(schema(format!(
            "multiple_choice[{index}].options: expected exactly {OPTION_COUNT} options, got {}",
            raw_options.len()
        )));
    }

    let mut options = Vec::with_capacity(OPTION_COUNT);
    for (opt_idx, opt) in raw_options.iter().enumerate() {
        let s = non_empty_string(Some(opt)).ok_or_else(|| {
            schema(format!(
                "multiple_choice[{index}].options[{opt_idx}]: expected a non-empty string"
            ))
        })?;
        options.push(s);
    }

    let distinct: HashSet<&str> = options.iter().map(String::as_str).collect();
    if distinct.len() != OPTION_COUNT {
        return Err(schema(format!(
            "multiple_choice[{index}].options: options must be distinct"
        )));
    }

    let answer = non_empty_string(obj.get("answer"))
        .ok_or_else(|| schema(format!("multiple_choice[{index}].answer: expected a non-empty string")))?;

    if !options.contains(&answer) {
        return Err(schema(format!(
            "multiple_choice[{index}].answer: '{answer}' is not one of the options"
        )));
    }

    Ok(MultipleChoiceQuestion {
        question,
        options,
        answer,
    })
}

fn validate_true_false(index: usize, value: &Value) -> Result<TrueFalseQuestion, QuizError> {
    let obj = value
        .as_object()
        .ok_or_else(|| schema(format!("true_false[{index}] is not an object")))?;

    let question = non_empty_string(obj.get("question"))
        .ok_or_else(|| schema(format!("true_false[{index}].question: expected a non-empty string")))?;

    // Case-sensitive literals, not booleans: downstream consumers compare
    // against exactly "True" / "False".
    let answer = obj
        .get("answer")
        .and_then(Value::as_str)
        .ok_or_else(|| schema(format!("true_false[{index}].answer: expected a string")))?;

    if answer != "True" && answer != "False" {
        return Err(schema(format!(
            "true_false[{index}].answer: expected \"True\" or \"False\", got '{answer}'"
        )));
    }

    Ok(TrueFalseQuestion {
        question,
        answer: answer.to_string(),
    })
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> String {
        json!({
            "multiple_choice": [{
                "question": "What is the capital of France?",
                "options": ["London", "Berlin", "Paris", "Madrid"],
                "answer": "Paris"
            }],
            "true_false": [{
                "question": "The sky is blue.",
                "answer": "True"
            }]
        })
        .to_string()
    }

    #[test]
    fn bare_json_is_accepted() {
        let quiz = normalize(&valid_payload()).unwrap();
        assert_eq!(quiz.multiple_choice.len(), 1);
        assert_eq!(quiz.true_false.len(), 1);
        assert_eq!(quiz.multiple_choice[0].answer, "Paris");
    }

    #[test]
    fn fenced_wrapping_is_transparent() {
        let bare = normalize(&valid_payload()).unwrap();
        let fenced = normalize(&format!("```json\n{}\n```", valid_payload())).unwrap();
        assert_eq!(bare, fenced);
    }

    #[test]
    fn fence_with_surrounding_prose_is_unwrapped() {
        let raw = format!(
            "Here is your quiz:\n```json\n{}\n```\nHope that helps!",
            valid_payload()
        );
        let quiz = normalize(&raw).unwrap();
        assert_eq!(quiz.question_count(), 2);
    }

    #[test]
    fn normalisation_is_idempotent() {
        let raw = format!("```json\n{}\n```", valid_payload());
        let first = normalize(&raw).unwrap();
        let second = normalize(&raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn prose_refusal_is_malformed() {
        let err = normalize("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, QuizError::MalformedResponse { .. }));
    }

    #[test]
    fn missing_section_key_is_schema_violation() {
        let raw = json!({ "multiple_choice": [] }).to_string();
        let err = normalize(&raw).unwrap_err();
        match err {
            QuizError::SchemaViolation { detail } => assert!(detail.contains("true_false")),
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn non_object_top_level_is_schema_violation() {
        let err = normalize("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, QuizError::SchemaViolation { .. }));
    }

    #[test]
    fn three_options_rejected_with_index_and_field() {
        let raw = json!({
            "multiple_choice": [{
                "question": "Q",
                "options": ["a", "b", "c"],
                "answer": "a"
            }],
            "true_false": []
        })
        .to_string();
        match normalize(&raw).unwrap_err() {
            QuizError::SchemaViolation { detail } => {
                assert!(detail.contains("multiple_choice[0].options"));
                assert!(detail.contains("got 3"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_options_rejected() {
        let raw = json!({
            "multiple_choice": [{
                "question": "Q",
                "options": ["a", "b", "b", "d"],
                "answer": "a"
            }],
            "true_false": []
        })
        .to_string();
        match normalize(&raw).unwrap_err() {
            QuizError::SchemaViolation { detail } => assert!(detail.contains("distinct")),
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn answer_outside_options_rejected() {
        let raw = json!({
            "multiple_choice": [{
                "question": "Q",
                "options": ["a", "b", "c", "d"],
                "answer": "e"
            }],
            "true_false": []
        })
        .to_string();
        match normalize(&raw).unwrap_err() {
            QuizError::SchemaViolation { detail } => {
                assert!(detail.contains("multiple_choice[0].answer"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn empty_question_rejected() {
        let raw = json!({
            "multiple_choice": [],
            "true_false": [{ "question": "   ", "answer": "True" }]
        })
        .to_string();
        match normalize(&raw).unwrap_err() {
            QuizError::SchemaViolation { detail } => {
                assert!(detail.contains("true_false[0].question"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn lowercase_boolean_literal_rejected() {
        let raw = json!({
            "multiple_choice": [],
            "true_false": [{ "question": "Q", "answer": "true" }]
        })
        .to_string();
        match normalize(&raw).unwrap_err() {
            QuizError::SchemaViolation { detail } => {
                assert!(detail.contains("true_false[0].answer"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn json_boolean_answer_rejected() {
        let raw = json!({
            "multiple_choice": [],
            "true_false": [{ "question": "Q", "answer": true }]
        })
        .to_string();
        assert!(matches!(
            normalize(&raw).unwrap_err(),
            QuizError::SchemaViolation { .. }
        ));
    }

    #[test]
    fn entry_order_is_preserved() {
        let raw = json!({
            "multiple_choice": [],
            "true_false": [
                { "question": "first", "answer": "True" },
                { "question": "second", "answer": "False" },
                { "question": "third", "answer": "True" }
            ]
        })
        .to_string();
        let quiz = normalize(&raw).unwrap();
        let questions: Vec<&str> = quiz.true_false.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(questions, vec!["first", "second", "third"]);
    }

    #[test]
    fn second_fence_in_output_is_ignored() {
        // Only the first json-tagged fence is the candidate; trailing fences
        // are treated as prose.
        let raw = format!(
            "```json\n{}\n```\nAnd here it is again:\n```json\n{{}}\n```",
            valid_payload()
        );
        let quiz = normalize(&raw).unwrap();
        assert_eq!(quiz.question_count(), 2);
    }
}
