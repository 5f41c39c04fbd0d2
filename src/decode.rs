//! Response decoding for the multi-question batch protocol.
//!
//! Deliberately lenient: the decoder rejects only replies that are not JSON
//! or that lack a top-level `answers` array. It does not require every item
//! to carry `question`/`answer` keys, and an answer count that differs from
//! the question count is logged, not failed — callers keep whatever the model
//! returned. See DESIGN.md for why the strict schema declared to the server
//! is not re-checked here.

use serde_json::Value;
use tracing::warn;

use crate::error::AskDocError;
use crate::question::AnswerSet;

/// Parse a raw model reply into an [`AnswerSet`].
///
/// `expected` is the question count; a mismatch only produces a warning.
pub fn decode_answers(raw: &str, expected: usize) -> Result<AnswerSet, AskDocError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AskDocError::MalformedServerResponse {
            detail: format!(
                "model did not return valid JSON: {e}\nRaw: {}",
                truncate(raw, 500)
            ),
        })?;

    let object = value
        .as_object()
        .ok_or_else(|| AskDocError::MalformedServerResponse {
            detail: "model JSON is not an object".into(),
        })?;

    if !object.contains_key("answers") {
        return Err(AskDocError::MalformedServerResponse {
            detail: "model JSON missing 'answers' array".into(),
        });
    }

    let set: AnswerSet =
        serde_json::from_value(value).map_err(|e| AskDocError::MalformedServerResponse {
            detail: format!("'answers' has unexpected shape: {e}"),
        })?;

    if set.len() != expected {
        warn!(
            "model returned {} answers for {} questions",
            set.len(),
            expected
        );
    }

    Ok(set)
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
