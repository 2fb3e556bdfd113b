//! Unknown-field detection and the extension bag that carries those fields across dialects.
//!
//! Every top-level payload type keeps the keys its dialect does not define in an
//! [`ExtensionMap`]. Detection is a plain set difference against the dialect's known keys;
//! the translator only ever reasons about the known subset and reattaches the rest verbatim.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::dialect::{ApiType, PayloadKind};
use crate::error::{BridgeError, Result};

/// String-keyed values a dialect does not recognize, in first-occurrence order.
pub type ExtensionMap = IndexMap<String, Value>;

pub const CHAT_REQUEST_KEYS: &[&str] = &[
    "model",
    "messages",
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

pub const RESPONSE_REQUEST_KEYS: &[&str] = &[
    "model",
    "input",
    "instructions",
    "temperature",
    "max_output_tokens",
    "top_p",
    "stream",
    "tools",
    "tool_choice",
    "text",
    "metadata",
];

pub const CHAT_RESPONSE_KEYS: &[&str] = &["id", "object", "created", "model", "choices", "usage"];

pub const RESPONSE_OBJECT_KEYS: &[&str] = &[
    "id",
    "object",
    "created_at",
    "model",
    "status",
    "output",
    "usage",
    "incomplete_details",
];

/// Known top-level keys for a dialect and payload kind.
pub fn known_keys(dialect: ApiType, kind: PayloadKind) -> &'static [&'static str] {
    match (dialect, kind) {
        (ApiType::ChatCompletions, PayloadKind::Request) => CHAT_REQUEST_KEYS,
        (ApiType::Response, PayloadKind::Request) => RESPONSE_REQUEST_KEYS,
        (ApiType::ChatCompletions, PayloadKind::Response) => CHAT_RESPONSE_KEYS,
        (ApiType::Response, PayloadKind::Response) => RESPONSE_OBJECT_KEYS,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnknownFieldsResult {
    pub unknown_fields: Vec<String>,
    pub cleaned_payload: Map<String, Value>,
}

impl UnknownFieldsResult {
    pub fn is_empty(&self) -> bool {
        self.unknown_fields.is_empty()
    }
}

/// Split `payload` into its known-key subset and the names of every other key.
pub fn detect(payload: &Map<String, Value>, known: &[&str]) -> UnknownFieldsResult {
    let mut result = UnknownFieldsResult::default();
    for (key, value) in payload {
        if known.contains(&key.as_str()) {
            result.cleaned_payload.insert(key.clone(), value.clone());
        } else {
            result.unknown_fields.push(key.clone());
        }
    }
    result
}

/// Pull the values for `result.unknown_fields` out of `payload`, keeping their order.
pub fn extract_extensions(payload: &Map<String, Value>, result: &UnknownFieldsResult) -> ExtensionMap {
    result
        .unknown_fields
        .iter()
        .filter_map(|key| payload.get(key).map(|v| (key.clone(), v.clone())))
        .collect()
}

/// Typed access to the known fields of a cleaned payload. Every failure names the field.
pub(crate) struct FieldReader {
    dialect: ApiType,
    map: Map<String, Value>,
}

impl FieldReader {
    pub(crate) fn new(dialect: ApiType, map: Map<String, Value>) -> Self {
        Self { dialect, map }
    }

    /// Remove and decode `key`. Absent keys and explicit `null` both read as `None`.
    pub(crate) fn optional<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.map.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| BridgeError::schema(self.dialect, key, e.to_string())),
        }
    }

    pub(crate) fn required<T: DeserializeOwned>(&mut self, key: &str) -> Result<T> {
        self.optional(key)?
            .ok_or_else(|| BridgeError::schema(self.dialect, key, "required field is missing"))
    }

    pub(crate) fn has(&self, key: &str) -> bool {
        self.map.get(key).is_some_and(|v| !v.is_null())
    }
}

/// Split a raw payload into a [`FieldReader`] over its known keys plus its extension bag.
pub(crate) fn open_payload(
    payload: &Value,
    dialect: ApiType,
    kind: PayloadKind,
) -> Result<(FieldReader, ExtensionMap, UnknownFieldsResult)> {
    let map = payload.as_object().ok_or_else(|| {
        BridgeError::schema(dialect, "$", "payload must be a JSON object")
    })?;

    let detected = detect(map, known_keys(dialect, kind));
    let extensions = extract_extensions(map, &detected);
    let reader = FieldReader::new(dialect, detected.cleaned_payload.clone());

    Ok((reader, extensions, detected))
}

/// Remove `key` from the bag and decode it as a destination field.
///
/// Bag values are never validated against the destination schema: an entry that does
/// not decode is discarded and recorded in `dropped`.
pub(crate) fn restore<T: DeserializeOwned>(
    bag: &mut ExtensionMap,
    key: &str,
    dropped: &mut Vec<String>,
) -> Option<T> {
    match bag.shift_remove(key) {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(_) => {
                dropped.push(key.to_string());
                None
            }
        },
    }
}

/// Natively mapped value wins; otherwise fall back to a bag entry under the same key.
/// A bag entry shadowed by a native value is recorded in `dropped`.
pub(crate) fn prefer_native<T: DeserializeOwned>(
    native: Option<T>,
    bag: &mut ExtensionMap,
    key: &str,
    dropped: &mut Vec<String>,
) -> Option<T> {
    if native.is_some() {
        if bag.shift_remove(key).is_some() {
            dropped.push(key.to_string());
        }
        return native;
    }
    restore(bag, key, dropped)
}

/// Remove bag entries that would collide with a key the destination serializes natively.
pub(crate) fn drop_collisions(bag: &mut ExtensionMap, native: &[&str], dropped: &mut Vec<String>) {
    bag.retain(|key, _| {
        if native.contains(&key.as_str()) {
            dropped.push(key.clone());
            false
        } else {
            true
        }
    });
}
