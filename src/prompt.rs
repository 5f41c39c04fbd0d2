//! Prompt construction for the multi-question batch protocol.
//!
//! Centralising the prompt text and the response schema here serves two
//! purposes:
//!
//! 1. **Single source of truth** — the answer contract (object with an
//!    `answers` array of `{question, answer, comment?}` items) is stated once
//!    and shared by the prompt, the request `format` field, and the decoder.
//!
//! 2. **Testability** — unit tests can inspect the built prompt directly
//!    without a live model.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::question::Question;

/// JSON schema the server is asked to constrain batch replies to.
///
/// Sent as the top-level `format` field of the generate request (structured
/// output mode). The decoder deliberately checks less than this schema
/// declares; see `decode`.
pub static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["answers"],
        "properties": {
            "answers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["question", "answer"],
                    "properties": {
                        "question": { "type": "string" },
                        "answer": { "type": ["string", "number", "boolean", "null"] },
                        "comment": { "type": "string" }
                    }
                }
            }
        }
    })
});

/// Build the single prompt for a multi-question batch call.
///
/// The prompt contains, in order: the read-the-page instruction, a literal
/// description of the required JSON reply, the rules, the numbered question
/// list annotated with expected answer types, and a closing instruction to
/// output only the JSON object.
///
/// Pure function of the batch; validation happens in the caller before this
/// is reached.
pub fn build_batch_prompt(questions: &[Question]) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(
        "You're analysing one page or a scanned document image. Carefully read all visible \
         text and layout."
            .to_string(),
    );
    lines.push(
        "Answer the following questions. Return a STRICT JSON object with the schema:\n\
         {\n  \"answers\": [\
         { \"question\": \"<original question>\", \"answer\": \"<your answer with appropriate JSON type>\", \"comment\": \"<your optional comment>\"}\
         <...one answer per question, same order...>\
         ]\n}"
            .to_string(),
    );
    lines.push("Rules:".to_string());
    lines.push("- Quote the original question in 'question' field of the answer JSON object.".to_string());
    lines.push("- Put your answer in 'answer' field of the answer JSON object.".to_string());
    lines.push(
        "- In answer value use native JSON types only: string, number, boolean, or null when uncertain."
            .to_string(),
    );
    lines.push(
        "- Add optional 'comment' field with your comments to the answer JSON object if needed."
            .to_string(),
    );
    lines.push("- Do not include any extra keys or text before/after the JSON.".to_string());
    lines.push("- The length of 'answers' must equal the number of questions asked.".to_string());
    lines.push(String::new());
    lines.push("Questions (with expected answer types):".to_string());
    for (i, q) in questions.iter().enumerate() {
        lines.push(format!(
            "{}. {} (answer with {} JSON type)",
            i + 1,
            q.text.trim(),
            q.answer_type.keyword()
        ));
    }
    lines.push(String::new());
    lines.push("Output only:".to_string());
    lines.push(
        "{\n  \"answers\": [ { \"question\": ..., \"answer\": ..., \"comment\": ... }, ... ]\n}"
            .to_string(),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::AnswerType;

    #[test]
    fn prompt_lists_questions_in_order_with_types() {
        let questions = vec![
            Question::new("What is the title of the form?"),
            Question::typed("How many ticks are on the page?", AnswerType::Number),
            Question::typed("Is the box checked?", AnswerType::Boolean),
        ];
        let prompt = build_batch_prompt(&questions);

        let p1 = prompt.find("1. What is the title of the form? (answer with string JSON type)");
        let p2 = prompt.find("2. How many ticks are on the page? (answer with number JSON type)");
        let p3 = prompt.find("3. Is the box checked? (answer with boolean JSON type)");
        assert!(p1.is_some() && p2.is_some() && p3.is_some(), "prompt:\n{prompt}");
        assert!(p1 < p2 && p2 < p3, "questions must keep batch order");
    }

    #[test]
    fn prompt_describes_the_answer_contract() {
        let prompt = build_batch_prompt(&[Question::new("Who signed it?")]);
        assert!(prompt.contains("STRICT JSON object"));
        assert!(prompt.contains("\"answers\""));
        assert!(prompt.contains("Output only:"));
        assert!(prompt.contains("same order"));
    }

    #[test]
    fn prompt_trims_question_text() {
        let prompt = build_batch_prompt(&[Question::new("  Who signed it?  ")]);
        assert!(prompt.contains("1. Who signed it? (answer with string JSON type)"));
    }

    #[test]
    fn response_schema_requires_answers() {
        let required = RESPONSE_SCHEMA["required"].as_array().unwrap();
        assert_eq!(required, &vec![serde_json::json!("answers")]);
        let item_required = RESPONSE_SCHEMA["properties"]["answers"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(item_required.len(), 2);
    }
}
