//! Type definitions for the Chat Completions dialect.
//!
//! Request types are what a chat-style client sends; response types are what a
//! chat-style backend returns. Top-level types keep every key the dialect does not
//! define in a flattened extension map.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::dialect::{ApiType, PayloadKind};
use super::unknown::{open_payload, ExtensionMap, UnknownFieldsResult};
use crate::error::{BridgeError, Result};

pub const SYSTEM_ROLE: &str = "system";
pub const ASSISTANT_ROLE: &str = "assistant";
pub const TOOL_ROLE: &str = "tool";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Sampling parameters are kept as JSON numbers so `1` stays `1` across a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionsRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    // Catch-all for keys outside the dialect
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

/// One entry of `messages`. Keys such as `name`, `tool_calls` and `tool_call_id`
/// ride along in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

/// Message content: a plain string or an array of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<Value>),
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    #[serde(default)]
    pub created: u64,
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String, // "function"
    pub function: ChatToolCallFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatToolCallFunction {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    // prompt_tokens_details, completion_tokens_details, ...
    #[serde(flatten)]
    pub extra: ExtensionMap,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl ChatCompletionsRequest {
    /// Parse a raw Chat request, splitting off unknown keys into the extension bag.
    pub fn from_value(payload: &Value) -> Result<(Self, UnknownFieldsResult)> {
        let dialect = ApiType::ChatCompletions;
        let (mut fields, extra, unknown) = open_payload(payload, dialect, PayloadKind::Request)?;

        if !fields.has("messages") {
            return Err(BridgeError::schema(
                dialect,
                "messages",
                "chat request requires a messages array",
            ));
        }

        let request = Self {
            model: fields.required("model")?,
            messages: fields.required("messages")?,
            temperature: fields.optional("temperature")?,
            max_tokens: fields.optional("max_tokens")?,
            top_p: fields.optional("top_p")?,
            frequency_penalty: fields.optional("frequency_penalty")?,
            presence_penalty: fields.optional("presence_penalty")?,
            n: fields.optional("n")?,
            stream: fields.optional("stream")?,
            tools: fields.optional("tools")?,
            tool_choice: fields.optional("tool_choice")?,
            response_format: fields.optional("response_format")?,
            metadata: fields.optional("metadata")?,
            extra,
        };

        Ok((request, unknown))
    }
}

impl ChatCompletion {
    pub fn from_value(payload: &Value) -> Result<(Self, UnknownFieldsResult)> {
        let (mut fields, extra, unknown) =
            open_payload(payload, ApiType::ChatCompletions, PayloadKind::Response)?;

        let completion = Self {
            id: fields.required("id")?,
            object: fields
                .optional("object")?
                .unwrap_or_else(|| "chat.completion".to_string()),
            created: fields.optional("created")?.unwrap_or_default(),
            model: fields.required("model")?,
            choices: fields.required("choices")?,
            usage: fields.optional("usage")?,
            extra,
        };

        Ok((completion, unknown))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ChatMessage {
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(MessageContent::Text(content.into())),
            extra: ExtensionMap::new(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == SYSTEM_ROLE
    }

    /// Text content of the message, empty when there is none.
    pub fn text_content(&self) -> String {
        self.content
            .as_ref()
            .map(MessageContent::as_text)
            .unwrap_or_default()
    }
}

impl MessageContent {
    /// Flatten to plain text. Text-bearing parts are joined with newlines, other parts
    /// (images, audio) are skipped.
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
