//! Translate request bodies between the Chat Completions and Response dialects.
//!
//! System messages fold into `instructions`, the remaining messages become `input`
//! items, and renamed fields move across. Chat-only sampling fields with no Response
//! equivalent are parked in the Response extension bag under their own keys so the
//! reverse translation can restore them exactly.
//!
//! Tool traffic maps onto typed input items: an assistant message holding only tool
//! calls becomes one `function_call` item per call, and a `tool` result message becomes
//! a `function_call_output` item. Consecutive `function_call` items merge back into a
//! single assistant message.

use serde_json::{json, Value};

use super::chat_types::{
    ChatCompletionsRequest, ChatMessage, ChatToolCall, ChatToolCallFunction, MessageContent,
    ASSISTANT_ROLE, SYSTEM_ROLE, TOOL_ROLE,
};
use super::dialect::{ApiType, PayloadKind};
use super::response_types::{
    InputItem, InputMessage, ResponseApiRequest, ResponseInput, TextConfig,
};
use super::unknown::{
    drop_collisions, prefer_native, restore, ExtensionMap, CHAT_REQUEST_KEYS,
    RESPONSE_REQUEST_KEYS,
};
use super::{unknown_of, Translated};
use crate::error::Result;

/// Chat fields that have no Response counterpart and travel in the extension bag.
pub const CHAT_ONLY_FIELDS: &[&str] = &["frequency_penalty", "presence_penalty", "n"];

const FUNCTION_CALL: &str = "function_call";
const FUNCTION_CALL_OUTPUT: &str = "function_call_output";
const FUNCTION_CALL_KEYS: &[&str] = &["type", "call_id", "name", "arguments"];
const FUNCTION_CALL_OUTPUT_KEYS: &[&str] = &["type", "call_id", "output"];

/// Translate a Chat Completions request into a Response request.
/// Pure function: the input is never modified and nothing is logged.
pub fn chat_to_response(req: &ChatCompletionsRequest) -> Result<Translated<ResponseApiRequest>> {
    let unknown = unknown_of(req, ApiType::ChatCompletions, PayloadKind::Request)?;

    let mut bag = req.extra.clone();
    let mut unmapped = Vec::new();
    let mut dropped = Vec::new();

    let mut system_text = Vec::new();
    let mut input = Vec::new();
    for (i, message) in req.messages.iter().enumerate() {
        if message.is_system() {
            system_text.push(message.text_content());
            report_folded_system_message(i, message, &mut dropped);
        } else {
            input.extend(message_to_input(message));
        }
    }
    let instructions = (!system_text.is_empty()).then(|| system_text.join("\n"));

    // A parked `text` object from an earlier Response -> Chat hop is the base; the
    // Chat response_format always supplies `format`.
    let mut text: Option<TextConfig> = restore(&mut bag, "text", &mut dropped);
    if let Some(ref format) = req.response_format {
        let text = text.get_or_insert_with(TextConfig::default);
        if text.format.replace(format.clone()).is_some() {
            dropped.push("text.format".to_string());
        }
    }

    let chat_only = [
        ("frequency_penalty", req.frequency_penalty.clone().map(Value::Number)),
        ("presence_penalty", req.presence_penalty.clone().map(Value::Number)),
        ("n", req.n.map(Value::from)),
    ];
    for (key, value) in chat_only {
        if let Some(value) = value {
            bag.insert(key.to_string(), value);
            unmapped.push(key.to_string());
        }
    }

    let instructions = prefer_native(instructions, &mut bag, "instructions", &mut dropped);
    let max_output_tokens =
        prefer_native(req.max_tokens, &mut bag, "max_output_tokens", &mut dropped);
    drop_collisions(&mut bag, RESPONSE_REQUEST_KEYS, &mut dropped);

    let payload = ResponseApiRequest {
        model: req.model.clone(),
        input: Some(ResponseInput::Items(input)),
        instructions,
        temperature: req.temperature.clone(),
        max_output_tokens,
        top_p: req.top_p.clone(),
        stream: req.stream,
        tools: req.tools.clone(),
        tool_choice: req.tool_choice.clone(),
        text,
        metadata: req.metadata.clone(),
        extra: bag,
    };

    Ok(Translated {
        payload,
        unknown,
        unmapped_fields: unmapped,
        dropped_fields: dropped,
    })
}

/// Translate a Response request into a Chat Completions request.
///
/// Non-empty `instructions` become a single leading system message. Extension-bag
/// entries named after Chat fields (`frequency_penalty`, `presence_penalty`, `n`, ...)
/// are restored to those fields; a fresh Response request simply leaves them absent.
pub fn response_to_chat(req: &ResponseApiRequest) -> Result<Translated<ChatCompletionsRequest>> {
    let unknown = unknown_of(req, ApiType::Response, PayloadKind::Request)?;

    let mut bag = req.extra.clone();
    let mut unmapped = Vec::new();
    let mut dropped = Vec::new();

    let mut messages = Vec::new();
    if let Some(instructions) = req.instructions.as_deref().filter(|s| !s.is_empty()) {
        messages.push(ChatMessage::text(SYSTEM_ROLE, instructions));
    }
    if let Some(ref input) = req.input {
        input_to_messages(input.clone().into_items(), &mut messages, &mut dropped)?;
    }

    let mut response_format = None;
    if let Some(ref text) = req.text {
        response_format = text.format.clone();
        // Anything besides `format` (or an empty object) has nowhere to go in Chat.
        if !text.extra.is_empty() || text.format.is_none() {
            let rest = TextConfig {
                format: None,
                extra: text.extra.clone(),
            };
            bag.insert("text".to_string(), serde_json::to_value(rest)?);
            unmapped.push("text".to_string());
        }
    }

    let frequency_penalty = restore(&mut bag, "frequency_penalty", &mut dropped);
    let presence_penalty = restore(&mut bag, "presence_penalty", &mut dropped);
    let n = restore(&mut bag, "n", &mut dropped);
    let max_tokens = prefer_native(req.max_output_tokens, &mut bag, "max_tokens", &mut dropped);
    let response_format =
        prefer_native(response_format, &mut bag, "response_format", &mut dropped);
    drop_collisions(&mut bag, CHAT_REQUEST_KEYS, &mut dropped);

    let payload = ChatCompletionsRequest {
        model: req.model.clone(),
        messages,
        temperature: req.temperature.clone(),
        max_tokens,
        top_p: req.top_p.clone(),
        frequency_penalty,
        presence_penalty,
        n,
        stream: req.stream,
        tools: req.tools.clone(),
        tool_choice: req.tool_choice.clone(),
        response_format,
        metadata: req.metadata.clone(),
        extra: bag,
    };

    Ok(Translated {
        payload,
        unknown,
        unmapped_fields: unmapped,
        dropped_fields: dropped,
    })
}

/// A text part carries nothing but `type` and `text`, so folding it loses nothing.
pub(crate) fn is_plain_text_part(part: &Value) -> bool {
    part.as_object().is_some_and(|map| {
        map.get("text").is_some_and(Value::is_string)
            && map.keys().all(|k| k == "text" || k == "type")
    })
}

/// `instructions` holds text only: report whatever else a folded system message carried.
fn report_folded_system_message(index: usize, message: &ChatMessage, dropped: &mut Vec<String>) {
    for key in message.extra.keys() {
        dropped.push(format!("messages[{index}].{key}"));
    }
    if let Some(MessageContent::Parts(parts)) = &message.content {
        for (j, part) in parts.iter().enumerate() {
            if !is_plain_text_part(part) {
                dropped.push(format!("messages[{index}].content[{j}]"));
            }
        }
    }
}

fn message_to_input(message: &ChatMessage) -> Vec<InputItem> {
    if let Some(output) = tool_result_item(message) {
        return vec![output];
    }
    if let Some(calls) = tool_call_items(message) {
        return calls;
    }
    vec![InputItem::Message(InputMessage {
        role: message.role.clone(),
        content: message.content.clone(),
        extra: message.extra.clone(),
    })]
}

/// A `tool` message holding only its text result and `tool_call_id`.
fn tool_result_item(message: &ChatMessage) -> Option<InputItem> {
    if message.role != TOOL_ROLE || message.extra.len() != 1 {
        return None;
    }
    let call_id = message.extra.get("tool_call_id")?.as_str()?;
    let Some(MessageContent::Text(output)) = &message.content else {
        return None;
    };

    Some(InputItem::Item(json!({
        "type": FUNCTION_CALL_OUTPUT,
        "call_id": call_id,
        "output": output,
    })))
}

/// An assistant message holding only well-formed function tool calls.
fn tool_call_items(message: &ChatMessage) -> Option<Vec<InputItem>> {
    if message.role != ASSISTANT_ROLE || message.content.is_some() || message.extra.len() != 1 {
        return None;
    }
    let raw = message.extra.get("tool_calls")?;
    let calls: Vec<ChatToolCall> = serde_json::from_value(raw.clone()).ok()?;
    // Keys outside the typed call would be lost
    if calls.is_empty()
        || calls.iter().any(|c| c.call_type != "function")
        || serde_json::to_value(&calls).ok()? != *raw
    {
        return None;
    }

    Some(
        calls
            .into_iter()
            .map(|call| {
                InputItem::Item(json!({
                    "type": FUNCTION_CALL,
                    "call_id": call.id,
                    "name": call.function.name,
                    "arguments": call.function.arguments,
                }))
            })
            .collect(),
    )
}

fn input_to_messages(
    items: Vec<InputItem>,
    messages: &mut Vec<ChatMessage>,
    dropped: &mut Vec<String>,
) -> Result<()> {
    // Consecutive function_call items share one assistant message
    let mut pending_calls = Vec::new();

    for (i, item) in items.into_iter().enumerate() {
        match item {
            InputItem::Message(message) => {
                flush_calls(&mut pending_calls, messages)?;
                messages.push(ChatMessage {
                    role: message.role,
                    content: message.content,
                    extra: message.extra,
                });
            }
            InputItem::Item(raw) => match raw.get("type").and_then(Value::as_str) {
                Some(FUNCTION_CALL) => match function_call_from_item(&raw, i, dropped) {
                    Some(call) => pending_calls.push(call),
                    None => dropped.push(format!("input[{i}]")),
                },
                Some(FUNCTION_CALL_OUTPUT) => {
                    flush_calls(&mut pending_calls, messages)?;
                    match tool_result_from_item(&raw, i, dropped) {
                        Some(message) => messages.push(message),
                        None => dropped.push(format!("input[{i}]")),
                    }
                }
                // item_reference, reasoning, ... have no Chat message form
                _ => dropped.push(format!("input[{i}]")),
            },
        }
    }

    flush_calls(&mut pending_calls, messages)
}

fn flush_calls(pending: &mut Vec<ChatToolCall>, messages: &mut Vec<ChatMessage>) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }

    let mut extra = ExtensionMap::new();
    extra.insert(
        "tool_calls".to_string(),
        serde_json::to_value(std::mem::take(pending))?,
    );
    messages.push(ChatMessage {
        role: ASSISTANT_ROLE.to_string(),
        content: None,
        extra,
    });
    Ok(())
}

fn function_call_from_item(raw: &Value, index: usize, dropped: &mut Vec<String>) -> Option<ChatToolCall> {
    let field = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    let call = ChatToolCall {
        id: field("call_id")?,
        call_type: "function".to_string(),
        function: ChatToolCallFunction {
            name: field("name")?,
            arguments: field("arguments")?,
        },
    };

    report_item_extras(raw, FUNCTION_CALL_KEYS, index, dropped);
    Some(call)
}

fn tool_result_from_item(raw: &Value, index: usize, dropped: &mut Vec<String>) -> Option<ChatMessage> {
    let call_id = raw.get("call_id")?.as_str()?;
    let output = raw.get("output")?.as_str()?;

    report_item_extras(raw, FUNCTION_CALL_OUTPUT_KEYS, index, dropped);
    let mut message = ChatMessage::text(TOOL_ROLE, output);
    message
        .extra
        .insert("tool_call_id".to_string(), Value::String(call_id.to_string()));
    Some(message)
}

/// Item keys such as `id` and `status` have no place on a Chat message.
fn report_item_extras(raw: &Value, known: &[&str], index: usize, dropped: &mut Vec<String>) {
    if let Some(map) = raw.as_object() {
        for key in map.keys().filter(|k| !known.contains(&k.as_str())) {
            dropped.push(format!("input[{index}].{key}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Number};

    fn chat(value: Value) -> ChatCompletionsRequest {
        ChatCompletionsRequest::from_value(&value).unwrap().0
    }

    fn response(value: Value) -> ResponseApiRequest {
        ResponseApiRequest::from_value(&value).unwrap().0
    }

    #[test]
    fn test_system_messages_fold_into_instructions() {
        let req = chat(json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": "Be terse."},
                {"role": "user", "content": "hi"}
            ]
        }));

        let out = chat_to_response(&req).unwrap().payload;
        assert_eq!(out.instructions.as_deref(), Some("Be terse."));
        assert_eq!(
            out.input,
            Some(ResponseInput::Items(vec![InputItem::text("user", "hi")]))
        );

        let back = response_to_chat(&out).unwrap().payload;
        assert_eq!(back, req);
    }

    #[test]
    fn test_multiple_system_messages_join_with_newline() {
        let req = chat(json!({
            "model": "m",
            "messages": [
                {"role": "system", "content": "One."},
                {"role": "user", "content": "q"},
                {"role": "system", "content": "Two."}
            ]
        }));

        let out = chat_to_response(&req).unwrap().payload;
        assert_eq!(out.instructions.as_deref(), Some("One.\nTwo."));

        let back = response_to_chat(&out).unwrap().payload;
        assert_eq!(back.messages.len(), 2);
        assert_eq!(back.messages[0], ChatMessage::text("system", "One.\nTwo."));
    }

    #[test]
    fn test_no_system_message_means_no_instructions() {
        let req = chat(json!({"model": "m", "messages": [{"role": "user", "content": "q"}]}));
        let out = chat_to_response(&req).unwrap().payload;
        assert!(out.instructions.is_none());
    }

    #[test]
    fn test_renames_and_pass_through_fields() {
        let req = chat(json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "q"}],
            "max_tokens": 256,
            "response_format": {"type": "json_object"},
            "temperature": 0.3,
            "top_p": 0.9,
            "stream": true,
            "tools": [{"type": "function", "function": {"name": "f"}}],
            "tool_choice": "auto",
            "metadata": {"trace": "abc"}
        }));

        let translated = chat_to_response(&req).unwrap();
        let out = serde_json::to_value(&translated.payload).unwrap();

        assert_eq!(out["max_output_tokens"], json!(256));
        assert_eq!(out["text"], json!({"format": {"type": "json_object"}}));
        assert_eq!(out["temperature"], json!(0.3));
        assert_eq!(out["top_p"], json!(0.9));
        assert_eq!(out["stream"], json!(true));
        assert_eq!(out["tools"], json!([{"type": "function", "function": {"name": "f"}}]));
        assert_eq!(out["tool_choice"], json!("auto"));
        assert_eq!(out["metadata"], json!({"trace": "abc"}));
        assert!(out.get("max_tokens").is_none());
        assert!(out.get("response_format").is_none());
        assert!(translated.unmapped_fields.is_empty());
    }

    #[test]
    fn test_chat_only_fields_ride_in_extension_bag() {
        let req = chat(json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "q"}],
            "frequency_penalty": 0.2,
            "presence_penalty": -0.5,
            "n": 3
        }));

        let translated = chat_to_response(&req).unwrap();
        assert_eq!(
            translated.unmapped_fields,
            vec!["frequency_penalty", "presence_penalty", "n"]
        );
        assert_eq!(translated.payload.extra["frequency_penalty"], json!(0.2));
        assert_eq!(translated.payload.extra["n"], json!(3));

        let back = response_to_chat(&translated.payload).unwrap().payload;
        assert_eq!(back.frequency_penalty, Number::from_f64(0.2));
        assert_eq!(back.presence_penalty, Number::from_f64(-0.5));
        assert_eq!(back.n, Some(3));
        assert!(back.extra.is_empty());
    }

    #[test]
    fn test_fresh_response_request_leaves_chat_only_fields_absent() {
        let req = response(json!({"model": "o3", "input": "hello"}));
        let out = response_to_chat(&req).unwrap().payload;
        assert!(out.frequency_penalty.is_none());
        assert!(out.presence_penalty.is_none());
        assert!(out.n.is_none());
        assert_eq!(out.messages, vec![ChatMessage::text("user", "hello")]);
    }

    #[test]
    fn test_empty_instructions_produce_no_system_message() {
        let req = response(json!({"model": "o3", "instructions": "", "input": []}));
        let out = response_to_chat(&req).unwrap().payload;
        assert!(out.messages.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_both_directions() {
        let req = chat(json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "q"}],
            "seed": 1234,
            "user": "u-42"
        }));

        let forward = chat_to_response(&req).unwrap();
        assert_eq!(forward.unknown.unknown_fields, vec!["seed", "user"]);
        assert_eq!(forward.payload.extra["seed"], json!(1234));

        let back = response_to_chat(&forward.payload).unwrap();
        assert_eq!(back.payload.extra["seed"], json!(1234));
        assert_eq!(back.payload.extra["user"], json!("u-42"));
        assert_eq!(back.payload, req);
    }

    #[test]
    fn test_text_keys_without_chat_equivalent_are_parked() {
        let req = response(json!({
            "model": "o3",
            "input": "x",
            "text": {"format": {"type": "text"}, "verbosity": "low"}
        }));

        let translated = response_to_chat(&req).unwrap();
        assert_eq!(translated.payload.response_format, Some(json!({"type": "text"})));
        assert_eq!(translated.payload.extra["text"], json!({"verbosity": "low"}));
        assert_eq!(translated.unmapped_fields, vec!["text"]);

        let forward = chat_to_response(&translated.payload).unwrap().payload;
        let text = forward.text.unwrap();
        assert_eq!(text.format, Some(json!({"type": "text"})));
        assert_eq!(text.extra["verbosity"], json!("low"));
    }

    #[test]
    fn test_bag_entry_shadowed_by_native_field_is_reported() {
        let req = response(json!({
            "model": "o3",
            "input": "x",
            "max_output_tokens": 100,
            "max_tokens": 5,
            "messages": "ignored"
        }));

        let translated = response_to_chat(&req).unwrap();
        assert_eq!(translated.payload.max_tokens, Some(100));
        assert_eq!(translated.dropped_fields, vec!["max_tokens", "messages"]);
        assert!(translated.payload.extra.is_empty());
    }

    #[test]
    fn test_bag_entry_fills_missing_native_field() {
        let req = response(json!({"model": "o3", "input": "x", "max_tokens": 5}));
        let translated = response_to_chat(&req).unwrap();
        assert_eq!(translated.payload.max_tokens, Some(5));
        assert!(translated.dropped_fields.is_empty());
    }

    #[test]
    fn test_message_extras_and_parts_carry_over() {
        let req = chat(json!({
            "model": "m",
            "messages": [
                {"role": "user", "name": "alice", "content": [
                    {"type": "text", "text": "look"},
                    {"type": "image_url", "image_url": {"url": "https://x/y.png"}}
                ]},
                {"role": "assistant", "content": null, "tool_calls": [{"id": "c1"}]}
            ]
        }));

        let out = chat_to_response(&req).unwrap().payload;
        let Some(ResponseInput::Items(items)) = &out.input else {
            panic!("expected input items");
        };
        let (InputItem::Message(first), InputItem::Message(second)) = (&items[0], &items[1]) else {
            panic!("expected message items");
        };
        assert_eq!(first.extra["name"], json!("alice"));
        assert!(matches!(first.content, Some(MessageContent::Parts(_))));
        // Not a well-formed tool call, so it stays a message
        assert_eq!(second.extra["tool_calls"], json!([{"id": "c1"}]));

        assert_eq!(response_to_chat(&out).unwrap().payload, req);
    }

    #[test]
    fn test_folded_system_message_reports_what_instructions_cannot_hold() {
        let req = chat(json!({
            "model": "m",
            "messages": [
                {"role": "system", "name": "policy", "content": [
                    {"type": "text", "text": "S"},
                    {"type": "image_url", "image_url": {"url": "https://x/logo.png"}}
                ]},
                {"role": "user", "content": "hi"}
            ]
        }));

        let translated = chat_to_response(&req).unwrap();
        assert_eq!(translated.payload.instructions.as_deref(), Some("S"));
        assert_eq!(
            translated.dropped_fields,
            vec!["messages[0].name", "messages[0].content[1]"]
        );
    }

    #[test]
    fn test_plain_system_text_parts_drop_nothing() {
        let req = chat(json!({
            "model": "m",
            "messages": [
                {"role": "system", "content": [{"type": "text", "text": "A"}, {"type": "text", "text": "B"}]},
                {"role": "user", "content": "hi"}
            ]
        }));

        let translated = chat_to_response(&req).unwrap();
        assert_eq!(translated.payload.instructions.as_deref(), Some("A\nB"));
        assert!(translated.dropped_fields.is_empty());
    }

    #[test]
    fn test_undecodable_bag_entries_are_dropped_not_rejected() {
        let req = chat(json!({
            "model": "m",
            "messages": [{"role": "user", "content": "hi"}],
            "text": "client note",
            "instructions": 42
        }));

        let translated = chat_to_response(&req).unwrap();
        assert_eq!(translated.dropped_fields, vec!["text", "instructions"]);
        assert!(translated.payload.text.is_none());
        assert!(translated.payload.instructions.is_none());
        assert!(translated.payload.extra.is_empty());

        let req = response(json!({"model": "o3", "input": "hi", "n": "three"}));
        let translated = response_to_chat(&req).unwrap();
        assert_eq!(translated.dropped_fields, vec!["n"]);
        assert!(translated.payload.n.is_none());
    }

    #[test]
    fn test_integer_sampling_values_keep_their_form() {
        let original = json!({
            "model": "m",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 1,
            "top_p": 0.5,
            "presence_penalty": 0
        });

        let forward = chat_to_response(&chat(original.clone())).unwrap().payload;
        let forward_value = serde_json::to_value(&forward).unwrap();
        assert!(forward_value["temperature"].is_u64());
        assert!(forward_value["presence_penalty"].is_u64());

        let back = response_to_chat(&forward).unwrap().payload;
        assert_eq!(serde_json::to_value(&back).unwrap(), original);
    }

    #[test]
    fn test_tool_traffic_maps_to_function_call_items() {
        let req = chat(json!({
            "model": "m",
            "messages": [
                {"role": "user", "content": "weather in Paris and Rome?"},
                {"role": "assistant", "tool_calls": [
                    {"id": "c1", "type": "function", "function": {"name": "weather", "arguments": "{\"city\":\"Paris\"}"}},
                    {"id": "c2", "type": "function", "function": {"name": "weather", "arguments": "{\"city\":\"Rome\"}"}}
                ]},
                {"role": "tool", "tool_call_id": "c1", "content": "sunny"},
                {"role": "tool", "tool_call_id": "c2", "content": "rain"}
            ]
        }));

        let forward = chat_to_response(&req).unwrap().payload;
        let Some(ResponseInput::Items(items)) = &forward.input else {
            panic!("expected input items");
        };
        assert_eq!(items.len(), 5);
        assert_eq!(
            items[1],
            InputItem::Item(json!({
                "type": "function_call", "call_id": "c1", "name": "weather",
                "arguments": "{\"city\":\"Paris\"}"
            }))
        );
        assert_eq!(
            items[4],
            InputItem::Item(json!({"type": "function_call_output", "call_id": "c2", "output": "rain"}))
        );

        let back = response_to_chat(&forward).unwrap();
        assert!(back.dropped_fields.is_empty());
        assert_eq!(back.payload, req);
    }

    #[test]
    fn test_role_less_input_items_translate_or_are_reported() {
        let req = response(json!({
            "model": "o3",
            "input": [
                {"role": "user", "content": "6 * 7?"},
                {"type": "function_call", "id": "fc_1", "call_id": "c1", "name": "mul", "arguments": "{}"},
                {"type": "function_call_output", "call_id": "c1", "output": "42"},
                {"type": "item_reference", "id": "msg_0"}
            ]
        }));

        let translated = response_to_chat(&req).unwrap();
        assert_eq!(translated.dropped_fields, vec!["input[1].id", "input[3]"]);

        let messages = &translated.payload.messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].extra["tool_calls"][0]["id"], json!("c1"));
        assert_eq!(messages[2].role, "tool");
        assert_eq!(messages[2].extra["tool_call_id"], json!("c1"));
        assert_eq!(messages[2].text_content(), "42");
    }
}
