//! Round-trip verification: translate, translate back, and compare.
//!
//! Used by tests, the `/v1/roundtrip` diagnostic endpoint and optional shadow
//! verification. Never on the serving path otherwise.

use serde::Serialize;
use serde_json::{Map, Value};

use super::chat_types::SYSTEM_ROLE;
use super::dialect::{ApiType, PayloadKind, TranslationDirection};
use super::request::is_plain_text_part;
use super::translate_value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SemanticEquivalence {
    pub model: bool,
    pub content: bool,
    pub parameters: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundTripTestResult {
    pub success: bool,
    pub direction: TranslationDirection,
    pub original: Value,
    pub translated: Value,
    pub back_translated: Value,
    pub differences: Vec<String>,
    pub semantic_equivalence: SemanticEquivalence,
}

/// Apply `forward`, then its inverse, and compare the result against `payload`.
pub fn verify(payload: &Value, forward: TranslationDirection) -> RoundTripTestResult {
    let failed = |stage: &str, message: String, translated: Value| RoundTripTestResult {
        success: false,
        direction: forward,
        original: payload.clone(),
        translated,
        back_translated: Value::Null,
        differences: vec![format!("{stage} translation failed: {message}")],
        semantic_equivalence: SemanticEquivalence::default(),
    };

    let translated = match translate_value(forward, payload) {
        Ok(t) => t.payload,
        Err(e) => return failed("forward", e.to_string(), Value::Null),
    };
    let back_translated = match translate_value(forward.inverse(), &translated) {
        Ok(t) => t.payload,
        Err(e) => return failed("inverse", e.to_string(), translated),
    };

    let dialect = forward.source();
    let kind = forward.kind();
    let expected = canonicalize(payload, dialect, kind);
    let actual = canonicalize(&back_translated, dialect, kind);

    let mut differences = Vec::new();
    diff_values("", &expected, &actual, &mut differences);

    let (content_keys, parameter_keys) = categories(dialect, kind);
    let semantic_equivalence = SemanticEquivalence {
        model: payload.get("model") == back_translated.get("model"),
        content: !differences.iter().any(|d| touches(d, content_keys)),
        parameters: !differences.iter().any(|d| touches(d, parameter_keys)),
    };

    RoundTripTestResult {
        success: differences.is_empty(),
        direction: forward,
        original: payload.clone(),
        translated,
        back_translated,
        differences,
        semantic_equivalence,
    }
}

const CHAT_REQUEST_CONTENT: &[&str] = &["messages"];
const RESPONSE_REQUEST_CONTENT: &[&str] = &["input", "instructions"];
const CHAT_RESPONSE_CONTENT: &[&str] = &["choices"];
const RESPONSE_OBJECT_CONTENT: &[&str] = &["output"];

const CHAT_REQUEST_PARAMETERS: &[&str] = &[
    "temperature",
    "max_tokens",
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "n",
    "stream",
    "tools",
    "tool_choice",
    "response_format",
    "metadata",
];

const RESPONSE_REQUEST_PARAMETERS: &[&str] = &[
    "temperature",
    "max_output_tokens",
    "top_p",
    "stream",
    "tools",
    "tool_choice",
    "text",
    "metadata",
];

const CHAT_RESPONSE_PARAMETERS: &[&str] = &["id", "object", "created", "usage"];

const RESPONSE_OBJECT_PARAMETERS: &[&str] = &[
    "id",
    "object",
    "created_at",
    "status",
    "incomplete_details",
    "usage",
];

/// Top-level keys that make up the conversation content and the sampling/control
/// parameters of each dialect.
fn categories(dialect: ApiType, kind: PayloadKind) -> (&'static [&'static str], &'static [&'static str]) {
    match (dialect, kind) {
        (ApiType::ChatCompletions, PayloadKind::Request) => {
            (CHAT_REQUEST_CONTENT, CHAT_REQUEST_PARAMETERS)
        }
        (ApiType::Response, PayloadKind::Request) => {
            (RESPONSE_REQUEST_CONTENT, RESPONSE_REQUEST_PARAMETERS)
        }
        (ApiType::ChatCompletions, PayloadKind::Response) => {
            (CHAT_RESPONSE_CONTENT, CHAT_RESPONSE_PARAMETERS)
        }
        (ApiType::Response, PayloadKind::Response) => {
            (RESPONSE_OBJECT_CONTENT, RESPONSE_OBJECT_PARAMETERS)
        }
    }
}

fn touches(difference: &str, keys: &[&str]) -> bool {
    difference.starts_with('$')
        || keys.iter().any(|key| {
            difference
                .strip_prefix(key)
                .is_some_and(|rest| rest.starts_with([':', '.', '[']))
        })
}

/// Rewrite a payload into the form its round trip is expected to reproduce.
///
/// Null object members are removed everywhere. Numbers are compared exactly, so `1`
/// and `1.0` differ. Chat requests have their system
/// messages folded into one leading message. In Response requests a string `input`
/// becomes a single user item (an absent one becomes `[]`), and empty `instructions`
/// are removed.
fn canonicalize(payload: &Value, dialect: ApiType, kind: PayloadKind) -> Value {
    let mut value = strip_nulls(payload);
    if let Some(map) = value.as_object_mut() {
        match (dialect, kind) {
            (ApiType::ChatCompletions, PayloadKind::Request) => {
                if let Some(Value::Array(messages)) = map.get_mut("messages") {
                    fold_system_messages(messages);
                }
            }
            (ApiType::Response, PayloadKind::Request) => {
                if let Some(text) = map.get("input").and_then(Value::as_str).map(str::to_string) {
                    let item = serde_json::json!([{"role": "user", "content": text}]);
                    map.insert("input".to_string(), item);
                }
                if !map.contains_key("input") {
                    map.insert("input".to_string(), Value::Array(Vec::new()));
                }
                if map.get("instructions").and_then(Value::as_str) == Some("") {
                    map.remove("instructions");
                }
            }
            _ => {}
        }
    }
    value
}

fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}

/// Fold system messages into one leading message. Only their text folds: other keys
/// and non-text parts stay on the folded message so a round trip that loses them
/// shows up as a difference.
fn fold_system_messages(messages: &mut Vec<Value>) {
    let mut system_text = Vec::new();
    let mut kept_parts = Vec::new();
    let mut kept_keys = Map::new();
    let mut rest = Vec::with_capacity(messages.len());

    for message in messages.drain(..) {
        if message.get("role").and_then(Value::as_str) != Some(SYSTEM_ROLE) {
            rest.push(message);
            continue;
        }

        system_text.push(content_text(message.get("content")));
        let Value::Object(map) = message else {
            continue;
        };
        for (key, value) in map {
            match key.as_str() {
                "role" => {}
                "content" => {
                    if let Value::Array(parts) = value {
                        kept_parts.extend(parts.into_iter().filter(|p| !is_plain_text_part(p)));
                    }
                }
                _ => {
                    kept_keys.insert(key, value);
                }
            }
        }
    }

    let joined = system_text.join("\n");
    if !joined.is_empty() || !kept_parts.is_empty() || !kept_keys.is_empty() {
        let content = if kept_parts.is_empty() {
            Value::String(joined)
        } else {
            let mut parts = Vec::with_capacity(kept_parts.len() + 1);
            if !joined.is_empty() {
                parts.push(serde_json::json!({"type": "text", "text": joined}));
            }
            parts.extend(kept_parts);
            Value::Array(parts)
        };

        let mut folded = Map::new();
        folded.insert("role".to_string(), Value::from(SYSTEM_ROLE));
        folded.insert("content".to_string(), content);
        folded.extend(kept_keys);
        messages.push(Value::Object(folded));
    }
    messages.extend(rest);
}

fn content_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "$"
    } else {
        path
    }
}

fn diff_values(path: &str, expected: &Value, actual: &Value, out: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => {
            for (key, ev) in e {
                let child = child_path(path, key);
                match a.get(key) {
                    Some(av) => diff_values(&child, ev, av, out),
                    None => out.push(format!("{child}: missing after round trip (expected {ev})")),
                }
            }
            for (key, av) in a {
                if !e.contains_key(key) {
                    out.push(format!("{}: unexpected after round trip ({av})", child_path(path, key)));
                }
            }
        }
        (Value::Array(e), Value::Array(a)) => {
            if e.len() != a.len() {
                out.push(format!(
                    "{}: expected {} elements, got {}",
                    display_path(path),
                    e.len(),
                    a.len()
                ));
            }
            for (i, (ev, av)) in e.iter().zip(a).enumerate() {
                diff_values(&format!("{path}[{i}]"), ev, av, out);
            }
        }
        (e, a) if e == a => {}
        (e, a) => out.push(format!("{}: expected {e}, got {a}", display_path(path))),
    }
}
