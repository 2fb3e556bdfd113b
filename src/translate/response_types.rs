use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::chat_types::MessageContent;
use super::dialect::{ApiType, PayloadKind};
use super::unknown::{open_payload, ExtensionMap, UnknownFieldsResult};
use crate::error::{BridgeError, Result};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseApiRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<ResponseInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    // Catch-all for keys outside the dialect
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseInput {
    Text(String),
    Items(Vec<InputItem>),
}

/// One entry of an `input` array. Role-less items (`function_call`,
/// `function_call_output`, `item_reference`, ...) are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputItem {
    Message(InputMessage),
    Item(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

/// The `text` object. Only `format` has a Chat counterpart (`response_format`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseObject {
    pub id: String,
    pub object: String, // "response"
    #[serde(default)]
    pub created_at: u64,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub output: Vec<OutputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ResponseUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_details: Option<IncompleteDetails>,
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputItem {
    #[serde(rename = "message")]
    Message {
        id: String,
        role: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        content: Vec<OutputContent>,
    },
    #[serde(rename = "function_call")]
    FunctionCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        call_id: String,
        name: String,
        arguments: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
    // reasoning, web_search_call, ... kept opaque
    #[serde(untagged)]
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputContent {
    #[serde(rename = "output_text")]
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<Value>,
    },
    #[serde(rename = "refusal")]
    Refusal { refusal: String },
    #[serde(untagged)]
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    // input_tokens_details, output_tokens_details, ...
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompleteDetails {
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl ResponseApiRequest {
    /// Parse a raw Response request, splitting off unknown keys into the extension bag.
    pub fn from_value(payload: &Value) -> Result<(Self, UnknownFieldsResult)> {
        let dialect = ApiType::Response;
        let (mut fields, extra, unknown) = open_payload(payload, dialect, PayloadKind::Request)?;

        if !fields.has("input") && !fields.has("instructions") {
            return Err(BridgeError::schema(
                dialect,
                "input",
                "response request requires input or instructions",
            ));
        }

        let request = Self {
            model: fields.required("model")?,
            input: fields.optional("input")?,
            instructions: fields.optional("instructions")?,
            temperature: fields.optional("temperature")?,
            max_output_tokens: fields.optional("max_output_tokens")?,
            top_p: fields.optional("top_p")?,
            stream: fields.optional("stream")?,
            tools: fields.optional("tools")?,
            tool_choice: fields.optional("tool_choice")?,
            text: fields.optional("text")?,
            metadata: fields.optional("metadata")?,
            extra,
        };

        Ok((request, unknown))
    }
}

impl ResponseObject {
    pub fn from_value(payload: &Value) -> Result<(Self, UnknownFieldsResult)> {
        let (mut fields, extra, unknown) =
            open_payload(payload, ApiType::Response, PayloadKind::Response)?;

        let object = Self {
            id: fields.required("id")?,
            object: fields
                .optional("object")?
                .unwrap_or_else(|| "response".to_string()),
            created_at: fields.optional("created_at")?.unwrap_or_default(),
            model: fields.required("model")?,
            status: fields.optional("status")?,
            output: fields.required("output")?,
            usage: fields.optional("usage")?,
            incomplete_details: fields.optional("incomplete_details")?,
            extra,
        };

        Ok((object, unknown))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl InputItem {
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        InputItem::Message(InputMessage {
            role: role.into(),
            content: Some(MessageContent::Text(content.into())),
            extra: ExtensionMap::new(),
        })
    }
}

impl ResponseInput {
    /// Normalize to an item list; a bare string is one `user` item.
    pub fn into_items(self) -> Vec<InputItem> {
        match self {
            ResponseInput::Text(text) => vec![InputItem::text("user", text)],
            ResponseInput::Items(items) => items,
        }
    }
}

impl OutputContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            OutputContent::OutputText { text, .. } => Some(text),
            OutputContent::Refusal { .. } | OutputContent::Other(_) => None,
        }
    }
}
