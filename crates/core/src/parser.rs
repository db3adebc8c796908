//! Response parsing and normalization.
//!
//! Model output is untrusted text. The parser:
//! 1. locates a top-level JSON array (ignoring prose and code fences),
//! 2. parses it, failing with the serde diagnostic if that is impossible,
//! 3. coerces each element into a [`Question`], dropping the ones that
//!    cannot be coerced,
//! 4. truncates to the requested count and makes ids unique.
//!
//! A low yield is never an error; only an unparseable reply is.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ParseError;
use crate::question::Question;

/// Parse a raw model reply into at most `count` questions.
pub fn parse_questions(raw: &str, count: usize) -> Result<Vec<Question>, ParseError> {
    let elements = extract_json_array(raw)?;
    let total = elements.len();

    let mut questions: Vec<Question> = elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match normalize_question(element) {
            Ok(question) => Some(question),
            Err(reason) => {
                debug!(index, %reason, "Dropping malformed question");
                None
            }
        })
        .collect();

    let valid = questions.len();
    questions.truncate(count);
    make_ids_unique(&mut questions);

    debug!(total, valid, returned = questions.len(), "Parsed model reply");
    Ok(questions)
}

/// Find and parse the JSON array in `raw`.
///
/// Candidates are top-level `[` ... `]` spans in order. The first one that
/// parses to an array holding at least one object (or nothing) wins. An
/// array of bare scalars (e.g. "[2]" in prose, or a lone object's
/// `options`) is only used when every candidate parsed, none held an object
/// and the text holds no JSON object; otherwise the first parse failure is
/// reported. An unterminated span runs to the end of the text and ends the
/// search.
pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, ParseError> {
    let mut first_error: Option<String> = None;
    let mut scalar_fallback: Option<Vec<Value>> = None;
    let mut offset = 0;

    while let Some(found) = raw[offset..].find('[') {
        let start = offset + found;
        let end = matching_bracket(raw, start);
        let candidate = match end {
            Some(end) => &raw[start..=end],
            None => &raw[start..],
        };

        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Array(items)) => {
                if items.is_empty() || items.iter().any(Value::is_object) {
                    return Ok(items);
                }
                if scalar_fallback.is_none() {
                    scalar_fallback = Some(items);
                }
            }
            Ok(_) => {}
            Err(e) if first_error.is_none() => first_error = Some(e.to_string()),
            Err(_) => {}
        }

        match end {
            Some(end) => offset = end + 1,
            None => break,
        }
    }

    if let Some(err) = first_error {
        return Err(ParseError::InvalidJson(err));
    }
    if let Some(items) = scalar_fallback {
        return Ok(single_object(raw).unwrap_or(items));
    }

    single_object(raw)
}

/// Replies without any array: accept a lone JSON object as one element.
fn single_object(raw: &str) -> Result<Vec<Value>, ParseError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(ParseError::NoJsonFound);
    };
    if end < start {
        return Err(ParseError::NoJsonFound);
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(mut object)) => match object.remove("questions") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => {
                object.insert("questions".into(), other);
                Ok(vec![Value::Object(object)])
            }
            None => Ok(vec![Value::Object(object)]),
        },
        Ok(_) => Err(ParseError::NoJsonFound),
        Err(e) => Err(ParseError::InvalidJson(e.to_string())),
    }
}

/// Byte index of the `]` closing the `[` at `start`, skipping string contents.
fn matching_bracket(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate().skip(start) {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Why an element was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rejection {
    NotAnObject,
    MissingField(&'static str),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("element is not an object"),
            Self::MissingField(field) => write!(f, "missing or empty field '{field}'"),
        }
    }
}

fn normalize_question(element: &Value) -> Result<Question, Rejection> {
    let object = element.as_object().ok_or(Rejection::NotAnObject)?;

    Ok(Question {
        id: required(object, "id")?,
        question: required(object, "question")?,
        kind: required(object, "type")?,
        options: object.get("options").and_then(options),
        correct_answer: required(object, "correct_answer")?,
        difficulty: required(object, "difficulty")?,
        explanation: required(object, "explanation")?,
    })
}

fn required(object: &Map<String, Value>, field: &'static str) -> Result<String, Rejection> {
    object
        .get(field)
        .and_then(scalar_string)
        .filter(|s| !s.trim().is_empty())
        .ok_or(Rejection::MissingField(field))
}

/// Strings pass through; numbers and booleans are rendered.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A list of scalar options, or `None` for anything else (including `[]`).
fn options(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Null => {}
            other => out.push(scalar_string(other)?),
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Suffix repeated ids with "-2", "-3", ... keeping the first occurrence.
fn make_ids_unique(questions: &mut [Question]) {
    let mut seen: HashSet<String> = questions.iter().map(|q| q.id.clone()).collect();
    let mut first_use: HashSet<String> = HashSet::new();

    for question in questions.iter_mut() {
        if first_use.insert(question.id.clone()) {
            continue;
        }
        let base = question.id.clone();
        let mut n = 2;
        let mut candidate = format!("{base}-{n}");
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        seen.insert(candidate.clone());
        question.id = candidate;
    }
}
