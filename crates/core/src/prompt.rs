//! Prompt construction.
//!
//! Two modes:
//! - **Template mode**: the caller's template has `{name}` placeholders
//!   substituted in one left-to-right pass. Names that resolve to nothing are
//!   left in place verbatim; substituted values are never re-scanned.
//! - **Default mode**: a fixed, subject-specific instruction that asks for a
//!   JSON array of question objects.
//!
//! Placeholder precedence: the fixed set (`count`, `subject`, `year_band`,
//! `ema`, `age`, `language`, `context`), then context fields, then any other
//! top-level request field.

use std::collections::HashMap;

use crate::context::{MergedContext, render_value};
use crate::request::GenerationRequest;

/// Build the prompt for a request.
pub fn build_prompt(request: &GenerationRequest, context: &MergedContext) -> String {
    match request.custom_template() {
        Some(template) => {
            let values = placeholder_values(request, context);
            substitute(template, |name| values.get(name).map(String::as_str))
        }
        None => default_prompt(request, context),
    }
}

/// Every placeholder name that resolves for this request.
pub fn placeholder_values(
    request: &GenerationRequest,
    context: &MergedContext,
) -> HashMap<String, String> {
    let mut values = HashMap::new();
    values.insert("count".to_string(), request.count.to_string());
    values.insert("subject".to_string(), request.subject.clone());
    values.insert("year_band".to_string(), request.year_band.clone());
    values.insert("ema".to_string(), format_ema(request.ema));
    values.insert("context".to_string(), context.formatted().to_string());

    for (key, value) in context.entries() {
        values
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    values
        .entry("action".to_string())
        .or_insert_with(|| request.action.clone());
    for (key, value) in &request.extra {
        if let Some(rendered) = render_value(value) {
            values.entry(key.clone()).or_insert(rendered);
        }
    }

    values
}

/// Replace `{name}` tokens using `lookup`; unresolved tokens stay literal.
pub fn substitute<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let resolved = after
            .find(['{', '}'])
            .filter(|&end| after.as_bytes()[end] == b'}')
            .and_then(|end| lookup(&after[..end]).map(|value| (value, end)));

        match resolved {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render EMA; whole numbers keep a trailing ".0" ("1" becomes "1.0").
pub fn format_ema(ema: f64) -> String {
    if ema.is_finite() && ema.fract() == 0.0 {
        format!("{ema:.1}")
    } else {
        ema.to_string()
    }
}

struct SubjectGuidance {
    name: String,
    proficiency: Option<&'static str>,
    example_types: Option<&'static str>,
    explanation: &'static str,
}

fn guidance(subject: &str) -> SubjectGuidance {
    match subject.trim().to_ascii_lowercase().as_str() {
        "english" => SubjectGuidance {
            name: "English".into(),
            proficiency: Some("English proficiency"),
            example_types: Some("\"multiple_choice\", \"fill_in_blank\", \"comprehension\", etc."),
            explanation: "brief explanation of the answer",
        },
        "math" => SubjectGuidance {
            name: "Math".into(),
            proficiency: Some("math proficiency"),
            example_types: Some("\"multiple_choice\", \"word_problem\", \"calculation\", etc."),
            explanation: "brief explanation of the solution",
        },
        _ => SubjectGuidance {
            name: subject.to_string(),
            proficiency: None,
            example_types: None,
            explanation: "brief explanation",
        },
    }
}

fn default_prompt(request: &GenerationRequest, context: &MergedContext) -> String {
    let g = guidance(&request.subject);
    let count = request.count;
    let year_band = &request.year_band;
    let ema = format_ema(request.ema);

    let audience = match context.get("age") {
        Some(age) => format!("a {age}-year-old student"),
        None => "a student".to_string(),
    };

    let mut prompt = format!(
        "Generate {count} age-appropriate {name} questions for {audience} in year band {year_band}.\n\
         \n\
         Context:\n\
         {ctx}\n\
         - EMA (Expected Mastery Average): {ema}\n",
        name = g.name,
        ctx = context.formatted(),
    );

    if let Some(proficiency) = g.proficiency {
        let language = context.get("language").unwrap_or("en");
        prompt.push_str(&format!(
            "\nRequirements:\n\
             - Questions should be appropriate for year band {year_band}\n\
             - Difficulty should align with EMA score of {ema}\n\
             - Questions should match the student's {proficiency} level\n\
             - Return questions in {language}\n"
        ));
    }

    let type_hint = match g.example_types {
        Some(examples) => format!("question type (e.g., {examples})"),
        None => "question type".to_string(),
    };

    prompt.push_str(&format!(
        "\nReturn a JSON array with {count} questions. Each question should have:\n\
         - \"id\": unique identifier (string)\n\
         - \"question\": the question text (string)\n\
         - \"type\": {type_hint}\n\
         - \"options\": array of answer option strings, only for multiple_choice questions; \
         omit it or set it to null for every other type\n\
         - \"correct_answer\": the correct answer (string)\n\
         - \"difficulty\": difficulty level, e.g. \"easy\", \"medium\" or \"hard\" (string)\n\
         - \"explanation\": {explanation} (string)\n\
         \n\
         Format the response as valid JSON only, no markdown formatting.",
        explanation = g.explanation,
    ));

    prompt
}
