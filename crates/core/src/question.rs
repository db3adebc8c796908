//! Output records: validated questions and the generation result.

use serde::{Deserialize, Serialize};

/// One validated question.
///
/// Only ever constructed through the response parser's coercion step, never
/// by deserializing model output directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    pub question: String,

    /// Open tag: "multiple_choice", "fill_in_blank", "comprehension", ...
    #[serde(rename = "type")]
    pub kind: String,

    /// Answer choices; absent for question types without choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    pub correct_answer: String,

    pub difficulty: String,

    pub explanation: String,
}

/// The response of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub questions: Vec<Question>,
    pub message: String,
}

impl GenerationResult {
    /// A successful result whose message reports the number actually produced.
    pub fn success(subject: &str, questions: Vec<Question>) -> Self {
        let message = format!(
            "Successfully generated {} {} questions",
            questions.len(),
            subject
        );
        Self {
            success: true,
            questions,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(options: Option<Vec<String>>) -> Question {
        Question {
            id: "q1".into(),
            question: "2 + 2?".into(),
            kind: "multiple_choice".into(),
            options,
            correct_answer: "4".into(),
            difficulty: "easy".into(),
            explanation: "Add them".into(),
        }
    }

    #[test]
    fn type_field_is_renamed() {
        let json = serde_json::to_value(sample(None)).unwrap();
        assert_eq!(json["type"], "multiple_choice");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn options_omitted_when_absent() {
        let json = serde_json::to_value(sample(None)).unwrap();
        assert!(json.get("options").is_none());

        let json = serde_json::to_value(sample(Some(vec!["3".into(), "4".into()]))).unwrap();
        assert_eq!(json["options"], serde_json::json!(["3", "4"]));
    }

    #[test]
    fn success_message_uses_actual_count() {
        let result = GenerationResult::success("English", vec![sample(None), sample(None)]);
        assert!(result.success);
        assert_eq!(result.message, "Successfully generated 2 English questions");

        let empty = GenerationResult::success("Math", vec![]);
        assert!(empty.success);
        assert!(empty.questions.is_empty());
        assert_eq!(empty.message, "Successfully generated 0 Math questions");
    }
}
