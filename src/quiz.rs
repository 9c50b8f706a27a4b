//! The validated quiz value returned to callers.
//!
//! A [`Quiz`] only ever exists after the response normaliser has checked every
//! invariant, so holders can rely on the schema without re-validating:
//! every multiple-choice question has exactly four distinct non-empty options
//! and an answer that is one of them, and every true/false answer is the
//! literal string `"True"` or `"False"` (a string, not a boolean — downstream
//! consumers compare against these exact literals).
//!
//! Serialises to the wire shape:
//!
//! ```json
//! { "multiple_choice": [ { "question": "...", "options": ["..","..","..",".."], "answer": ".." } ],
//!   "true_false":      [ { "question": "...", "answer": "True" } ] }
//! ```

use serde::{Deserialize, Serialize};

/// A question with four options, one of which is the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    pub question: String,
    /// Exactly four distinct, non-empty option strings.
    pub options: Vec<String>,
    /// Always equal to one element of `options`.
    pub answer: String,
}

/// A statement the quiz-taker judges as `"True"` or `"False"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    pub question: String,
    /// The literal string `"True"` or `"False"`.
    pub answer: String,
}

/// A validated quiz: both sections preserve the order the model returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub multiple_choice: Vec<MultipleChoiceQuestion>,
    pub true_false: Vec<TrueFalseQuestion>,
}

impl Quiz {
    /// Total number of questions across both sections.
    pub fn question_count(&self) -> usize {
        self.multiple_choice.len() + self.true_false.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multiple_choice.is_empty() && self.true_false.is_empty()
    }
}
