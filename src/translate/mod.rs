//! Schema translation between the Chat Completions and Response dialects.
//!
//! The core of the bridge: resolves which way a payload must be reshaped, maps fields
//! between the two dialects, carries unrecognized fields through untouched, and checks
//! itself with round trips. All translation functions are pure (no I/O).

pub mod chat_types;
pub mod dialect;
pub mod request;
pub mod response;
pub mod response_types;
pub mod roundtrip;
pub mod unknown;

use serde::Serialize;
use serde_json::Value;

use self::chat_types::{ChatCompletion, ChatCompletionsRequest};
use self::dialect::{ApiType, PayloadKind, TranslationDirection};
use self::response_types::{ResponseApiRequest, ResponseObject};
use self::unknown::{detect, known_keys, UnknownFieldsResult};
use crate::error::Result;

/// A translated payload plus what the translation had to do with fields that don't map
/// one-to-one.
#[derive(Debug, Clone, PartialEq)]
pub struct Translated<T> {
    pub payload: T,
    /// Source keys outside the source dialect, carried verbatim.
    pub unknown: UnknownFieldsResult,
    /// Known source fields with no destination equivalent, parked in the destination
    /// extension bag ("unknown on write").
    pub unmapped_fields: Vec<String>,
    /// Extension-bag entries or output items the destination could not hold.
    pub dropped_fields: Vec<String>,
}

impl<T: Serialize> Translated<T> {
    pub fn into_value(self) -> Result<Translated<Value>> {
        Ok(Translated {
            payload: serde_json::to_value(&self.payload)?,
            unknown: self.unknown,
            unmapped_fields: self.unmapped_fields,
            dropped_fields: self.dropped_fields,
        })
    }
}

/// Parse `payload` in the direction's source dialect, translate, and serialize the result.
pub fn translate_value(direction: TranslationDirection, payload: &Value) -> Result<Translated<Value>> {
    match direction {
        TranslationDirection::ChatToResponse => {
            let (req, _) = ChatCompletionsRequest::from_value(payload)?;
            request::chat_to_response(&req)?.into_value()
        }
        TranslationDirection::ResponseToChat => {
            let (req, _) = ResponseApiRequest::from_value(payload)?;
            request::response_to_chat(&req)?.into_value()
        }
        TranslationDirection::ChatToResponseResponse => {
            let (resp, _) = ChatCompletion::from_value(payload)?;
            response::chat_to_response_response(&resp)?.into_value()
        }
        TranslationDirection::ResponseToChatResponse => {
            let (resp, _) = ResponseObject::from_value(payload)?;
            response::response_to_chat_response(&resp)?.into_value()
        }
    }
}

/// Unknown-field report for an already typed payload.
pub(crate) fn unknown_of<T: Serialize>(
    payload: &T,
    dialect: ApiType,
    kind: PayloadKind,
) -> Result<UnknownFieldsResult> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => Ok(detect(&map, known_keys(dialect, kind))),
        _ => Ok(UnknownFieldsResult::default()),
    }
}
