//! Typed questions and decoded answers.
//!
//! [`Question`] is the caller-facing value for batch mode; [`AnswerItem`] and
//! [`AnswerSet`] are produced by the response decoder. Serde field names
//! (`question`, `type`, `answer`, `comment`, `answers`) match the wire
//! protocol, so a JSON questions file and a model reply both deserialize
//! directly into these types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AskDocError;

/// Expected JSON type of an answer.
///
/// The batch prompt annotates each question with this keyword so the model
/// picks the right JSON type; anything outside the three literals is rejected
/// before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    /// Free-text answer. (default)
    #[default]
    String,
    /// Numeric answer (integer or float).
    Number,
    /// Yes/no answer.
    Boolean,
}

impl AnswerType {
    /// The keyword used in prompts and on the wire.
    pub fn keyword(&self) -> &'static str {
        match self {
            AnswerType::String => "string",
            AnswerType::Number => "number",
            AnswerType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for AnswerType {
    type Err = AskDocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(AnswerType::String),
            "number" => Ok(AnswerType::Number),
            "boolean" => Ok(AnswerType::Boolean),
            other => Err(AskDocError::InvalidQuestionBatch(format!(
                "unsupported question type '{other}'; allowed: string, number, boolean"
            ))),
        }
    }
}

/// One typed question about a page.
///
/// Immutable once created; order within a batch is significant because the
/// model is instructed to answer in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text. Must be non-empty.
    #[serde(rename = "question")]
    pub text: String,

    /// Expected JSON type of the answer.
    #[serde(rename = "type", default)]
    pub answer_type: AnswerType,
}

impl Question {
    /// Create a question expecting a free-text answer.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answer_type: AnswerType::String,
        }
    }

    /// Create a question with an explicit expected answer type.
    pub fn typed(text: impl Into<String>, answer_type: AnswerType) -> Self {
        Self {
            text: text.into(),
            answer_type,
        }
    }
}

/// Validate a question batch before any prompt is built or request sent.
///
/// Rejects an empty batch and questions whose text is empty or whitespace.
/// Type literals are already closed by [`AnswerType`]; they can only be
/// invalid at deserialization time, where serde reports the bad literal.
pub fn validate_batch(questions: &[Question]) -> Result<(), AskDocError> {
    if questions.is_empty() {
        return Err(AskDocError::InvalidQuestionBatch(
            "'questions' must be a non-empty list".into(),
        ));
    }
    for (i, q) in questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            return Err(AskDocError::InvalidQuestionBatch(format!(
                "question {} has empty text",
                i + 1
            )));
        }
    }
    Ok(())
}

/// One decoded answer.
///
/// Produced by the response decoder; field values are passed through from the
/// model reply as-is. Missing keys are tolerated (see the decoder for the
/// lenient-shape rationale): an absent `question` becomes an empty string and
/// an absent `answer` becomes JSON null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerItem {
    /// Echo of the original question text, as quoted by the model.
    #[serde(default)]
    pub question: String,

    /// The answer value: string, number, boolean, or null.
    #[serde(default)]
    pub answer: Value,

    /// Optional free-form comment from the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Ordered answers for one batch call, wrapped under the wire key `answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub answers: Vec<AnswerItem>,
}

impl AnswerSet {
    /// Number of answers the model returned.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
