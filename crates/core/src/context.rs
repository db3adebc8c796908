//! Context merging: turns a [`StudentContext`] into placeholder values and a
//! human-readable context block.
//!
//! Known fields render with friendly labels ("- Age: 10"); unknown fields
//! render with their key title-cased ("learning_style" → "Learning Style"),
//! one per line, in input order. `null` values are skipped.

use serde_json::Value;

use crate::request::StudentContext;

/// A normalized view of a student context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedContext {
    values: Vec<(String, String)>,
    formatted: String,
}

impl MergedContext {
    /// Merge a context. Pure: the same input always yields the same output.
    pub fn merge(context: &StudentContext) -> Self {
        let mut values = Vec::new();
        let mut lines = Vec::new();

        let mut known = |key: &str, label: &str, value: String| {
            lines.push(format!("- {label}: {value}"));
            values.push((key.to_string(), value));
        };

        if let Some(age) = context.age {
            known("age", "Age", age.to_string());
        }
        if let Some(score) = context.onboarding_english_score {
            known(
                "onboarding_english_score",
                "Onboarding English Score",
                score.to_string(),
            );
        }
        if let Some(score) = context.onboarding_math_score {
            known(
                "onboarding_math_score",
                "Onboarding Math Score",
                score.to_string(),
            );
        }
        known("language", "Language", context.language.clone());

        for (key, value) in &context.extra {
            let Some(rendered) = render_value(value) else {
                continue;
            };
            lines.push(format!("- {}: {rendered}", title_case(key)));
            values.push((key.clone(), rendered));
        }

        Self {
            values,
            formatted: lines.join("\n"),
        }
    }

    /// Look up the string form of a context field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All rendered fields, known ones first, then extras in input order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The multi-line "- Label: value" block.
    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

/// String form of a JSON value for prompts. `None` for `null`.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// "learning_style" → "Learning Style".
fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> StudentContext {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn known_fields_use_friendly_labels() {
        let merged = MergedContext::merge(&context(json!({
            "age": 10,
            "onboarding_english_score": 72,
            "onboarding_math_score": 65,
            "language": "fr"
        })));
        assert_eq!(
            merged.formatted(),
            "- Age: 10\n- Onboarding English Score: 72\n- Onboarding Math Score: 65\n- Language: fr"
        );
        assert_eq!(merged.get("age"), Some("10"));
        assert_eq!(merged.get("language"), Some("fr"));
    }

    #[test]
    fn missing_optional_fields_are_skipped() {
        let merged = MergedContext::merge(&context(json!({ "age": 7 })));
        assert_eq!(merged.formatted(), "- Age: 7\n- Language: en");
        assert_eq!(merged.get("onboarding_math_score"), None);
    }

    #[test]
    fn missing_age_has_no_synthetic_default() {
        let merged = MergedContext::merge(&context(json!({})));
        assert_eq!(merged.get("age"), None);
        assert_eq!(merged.formatted(), "- Language: en");
    }

    #[test]
    fn extra_fields_title_cased_in_input_order() {
        let merged = MergedContext::merge(&context(json!({
            "age": 12,
            "learning_style": "visual",
            "interests": ["space", "dinosaurs"],
            "needs_support": true,
            "reading_level": 3
        })));
        assert_eq!(
            merged.formatted(),
            "- Age: 12\n- Language: en\n- Learning Style: visual\n\
             - Interests: [\"space\",\"dinosaurs\"]\n- Needs Support: true\n- Reading Level: 3"
        );
        assert_eq!(merged.get("learning_style"), Some("visual"));
        assert_eq!(merged.get("reading_level"), Some("3"));
    }

    #[test]
    fn null_extras_are_dropped() {
        let merged = MergedContext::merge(&context(json!({ "age": 9, "notes": null })));
        assert_eq!(merged.get("notes"), None);
        assert!(!merged.formatted().contains("Notes"));
    }

    #[test]
    fn merge_is_idempotent() {
        let ctx = context(json!({ "age": 10, "favourite_book": "Matilda", "pace": "slow" }));
        let first = MergedContext::merge(&ctx);
        let second = MergedContext::merge(&ctx);
        assert_eq!(first.formatted().as_bytes(), second.formatted().as_bytes());
        assert_eq!(first, second);
    }

    #[test]
    fn title_case_handles_mixed_input() {
        assert_eq!(title_case("learning_style"), "Learning Style");
        assert_eq!(title_case("GPA"), "Gpa");
        assert_eq!(title_case("x"), "X");
    }
}
