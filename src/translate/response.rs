//! Translate response bodies between the Chat Completions and Response dialects.
//!
//! Mirrors the request mapping: the first choice becomes the Response `output` items,
//! `finish_reason` maps onto `status`/`incomplete_details`, and anything the destination
//! cannot express natively is parked in its extension bag (or reported as dropped).

use serde_json::Value;

use super::chat_types::{
    ChatCompletion, ChatToolCall, ChatToolCallFunction, ChatUsage, Choice, ChoiceMessage,
    ASSISTANT_ROLE,
};
use super::dialect::{ApiType, PayloadKind};
use super::response_types::{
    IncompleteDetails, OutputContent, OutputItem, ResponseObject, ResponseUsage,
};
use super::unknown::{
    drop_collisions, restore, ExtensionMap, CHAT_RESPONSE_KEYS, RESPONSE_OBJECT_KEYS,
};
use super::{unknown_of, Translated};
use crate::error::Result;

const CHAT_COMPLETION_OBJECT: &str = "chat.completion";
const RESPONSE_OBJECT: &str = "response";
const ITEM_COMPLETED: &str = "completed";

/// Translate a Chat completion into a Response object.
pub fn chat_to_response_response(resp: &ChatCompletion) -> Result<Translated<ResponseObject>> {
    let unknown = unknown_of(resp, ApiType::ChatCompletions, PayloadKind::Response)?;

    let mut bag = resp.extra.clone();
    let mut unmapped = Vec::new();
    let mut dropped = Vec::new();

    let first = resp.choices.first();
    let output = first
        .map(|choice| choice_to_output(choice, &resp.id, &mut dropped))
        .unwrap_or_default();

    // Additional choices have no Response representation; park them verbatim.
    if resp.choices.len() > 1 {
        bag.insert(
            "choices".to_string(),
            serde_json::to_value(&resp.choices[1..])?,
        );
        unmapped.push("choices".to_string());
    }

    let finish_reason = first.and_then(|c| c.finish_reason.as_deref());
    let (derived_status, derived_details) = status_for_finish_reason(finish_reason);

    let status = restore::<String>(&mut bag, "status", &mut dropped).unwrap_or(derived_status);
    let incomplete_details =
        restore::<IncompleteDetails>(&mut bag, "incomplete_details", &mut dropped)
            .or(derived_details);
    drop_collisions(&mut bag, RESPONSE_OBJECT_KEYS, &mut dropped);

    let usage = resp.usage.as_ref().map(|u| ResponseUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
        extra: u.extra.clone(),
    });

    let payload = ResponseObject {
        id: resp.id.clone(),
        object: RESPONSE_OBJECT.to_string(),
        created_at: resp.created,
        model: resp.model.clone(),
        status: Some(status),
        output,
        usage,
        incomplete_details,
        extra: bag,
    };

    Ok(Translated {
        payload,
        unknown,
        unmapped_fields: unmapped,
        dropped_fields: dropped,
    })
}

/// Translate a Response object into a Chat completion.
pub fn response_to_chat_response(resp: &ResponseObject) -> Result<Translated<ChatCompletion>> {
    let unknown = unknown_of(resp, ApiType::Response, PayloadKind::Response)?;

    let mut bag = resp.extra.clone();
    let mut unmapped = Vec::new();
    let mut dropped = Vec::new();

    let mut role: Option<String> = None;
    let mut item_id: Option<String> = None;
    let mut texts: Vec<&str> = Vec::new();
    let mut refusals: Vec<&str> = Vec::new();
    let mut tool_calls: Vec<ChatToolCall> = Vec::new();

    for (i, item) in resp.output.iter().enumerate() {
        match item {
            OutputItem::Message {
                id,
                role: item_role,
                status,
                content,
            } => {
                // Message items merge into one Chat message that keeps only the first id
                if role.is_some() {
                    dropped.push(format!("output[{i}].id"));
                }
                role.get_or_insert_with(|| item_role.clone());
                item_id.get_or_insert_with(|| id.clone());
                report_item_status(status.as_deref(), i, &mut dropped);

                for (j, part) in content.iter().enumerate() {
                    match part {
                        OutputContent::OutputText { text, annotations } => {
                            if !annotations.is_empty() {
                                dropped.push(format!("output[{i}].content[{j}].annotations"));
                            }
                            texts.push(text);
                        }
                        OutputContent::Refusal { refusal } => refusals.push(refusal),
                        OutputContent::Other(_) => dropped.push(format!("output[{i}].content[{j}]")),
                    }
                }
            }
            OutputItem::FunctionCall {
                id,
                call_id,
                name,
                arguments,
                status,
            } => {
                if id.is_some() {
                    dropped.push(format!("output[{i}].id"));
                }
                report_item_status(status.as_deref(), i, &mut dropped);
                tool_calls.push(ChatToolCall {
                    id: call_id.clone(),
                    call_type: "function".to_string(),
                    function: ChatToolCallFunction {
                        name: name.clone(),
                        arguments: arguments.clone(),
                    },
                });
            }
            OutputItem::Other(_) => dropped.push(format!("output[{i}]")),
        }
    }

    let has_message = role.is_some();
    let mut choices = Vec::new();
    if has_message || !tool_calls.is_empty() {
        let finish_reason = finish_reason_for_status(
            resp.status.as_deref(),
            resp.incomplete_details.as_ref(),
            !tool_calls.is_empty(),
        );

        let mut choice_extra = ExtensionMap::new();
        if let Some(id) = item_id.filter(|id| *id != default_message_id(&resp.id)) {
            choice_extra.insert("id".to_string(), Value::String(id));
        }

        choices.push(Choice {
            index: 0,
            message: ChoiceMessage {
                role: role.unwrap_or_else(|| ASSISTANT_ROLE.to_string()),
                content: has_message.then(|| texts.concat()).filter(|_| !texts.is_empty()),
                refusal: (!refusals.is_empty()).then(|| refusals.concat()),
                tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                extra: ExtensionMap::new(),
            },
            finish_reason,
            extra: choice_extra,
        });
    }

    // Keep status/incomplete_details when they can't be re-derived from finish_reason.
    let finish_reason = choices.first().and_then(|c| c.finish_reason.as_deref());
    let (derived_status, derived_details) = status_for_finish_reason(finish_reason);
    if let Some(ref status) = resp.status {
        if *status != derived_status {
            bag.insert("status".to_string(), Value::String(status.clone()));
            unmapped.push("status".to_string());
        }
    }
    if resp.incomplete_details != derived_details {
        if let Some(ref details) = resp.incomplete_details {
            bag.insert("incomplete_details".to_string(), serde_json::to_value(details)?);
            unmapped.push("incomplete_details".to_string());
        }
    }

    if let Some(parked) = restore::<Vec<Choice>>(&mut bag, "choices", &mut dropped) {
        choices.extend(parked);
    }
    drop_collisions(&mut bag, CHAT_RESPONSE_KEYS, &mut dropped);

    let usage = resp.usage.as_ref().map(|u| ChatUsage {
        prompt_tokens: u.input_tokens,
        completion_tokens: u.output_tokens,
        total_tokens: u.total_tokens,
        extra: u.extra.clone(),
    });

    let payload = ChatCompletion {
        id: resp.id.clone(),
        object: CHAT_COMPLETION_OBJECT.to_string(),
        created: resp.created_at,
        model: resp.model.clone(),
        choices,
        usage,
        extra: bag,
    };

    Ok(Translated {
        payload,
        unknown,
        unmapped_fields: unmapped,
        dropped_fields: dropped,
    })
}

fn choice_to_output(choice: &Choice, response_id: &str, dropped: &mut Vec<String>) -> Vec<OutputItem> {
    let mut output = Vec::new();
    let message = &choice.message;

    for key in choice.extra.keys().filter(|k| k.as_str() != "id") {
        dropped.push(format!("choices[0].{key}"));
    }
    for key in message.extra.keys() {
        dropped.push(format!("choices[0].message.{key}"));
    }

    let mut content = Vec::new();
    if let Some(ref text) = message.content {
        content.push(OutputContent::OutputText {
            text: text.clone(),
            annotations: Vec::new(),
        });
    }
    if let Some(ref refusal) = message.refusal {
        content.push(OutputContent::Refusal {
            refusal: refusal.clone(),
        });
    }

    if !content.is_empty() {
        let id = choice
            .extra
            .get("id")
            .and_then(Value::as_str)
            .map_or_else(|| default_message_id(response_id), str::to_string);

        output.push(OutputItem::Message {
            id,
            role: message.role.clone(),
            status: Some(ITEM_COMPLETED.to_string()),
            content,
        });
    }

    for call in message.tool_calls.iter().flatten() {
        output.push(OutputItem::FunctionCall {
            id: None,
            call_id: call.id.clone(),
            name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
            status: Some(ITEM_COMPLETED.to_string()),
        });
    }

    output
}

/// Chat has no per-item status; only `completed` is re-derived on the way back.
fn report_item_status(status: Option<&str>, index: usize, dropped: &mut Vec<String>) {
    if status.is_some_and(|s| s != ITEM_COMPLETED) {
        dropped.push(format!("output[{index}].status"));
    }
}

fn default_message_id(response_id: &str) -> String {
    format!("msg_{response_id}")
}

/// Map a Chat `finish_reason` onto Response `status` and `incomplete_details`.
pub fn status_for_finish_reason(reason: Option<&str>) -> (String, Option<IncompleteDetails>) {
    let incomplete = |reason: &str| {
        (
            "incomplete".to_string(),
            Some(IncompleteDetails {
                reason: reason.to_string(),
            }),
        )
    };

    match reason {
        Some("length") => incomplete("max_output_tokens"),
        Some("content_filter") => incomplete("content_filter"),
        Some(_) => ("completed".to_string(), None),
        None => ("in_progress".to_string(), None),
    }
}

/// Map a Response `status` back onto a Chat `finish_reason`.
pub fn finish_reason_for_status(
    status: Option<&str>,
    details: Option<&IncompleteDetails>,
    has_tool_calls: bool,
) -> Option<String> {
    match status {
        Some("completed") if has_tool_calls => Some("tool_calls".to_string()),
        Some("completed") => Some("stop".to_string()),
        Some("incomplete") => match details.map(|d| d.reason.as_str()) {
            Some("content_filter") => Some("content_filter".to_string()),
            _ => Some("length".to_string()),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion(value: Value) -> ChatCompletion {
        ChatCompletion::from_value(&value).unwrap().0
    }

    fn simple_completion() -> ChatCompletion {
        completion(json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
        }))
    }

    #[test]
    fn test_simple_text_response() {
        let out = chat_to_response_response(&simple_completion()).unwrap().payload;

        assert_eq!(out.object, "response");
        assert_eq!(out.created_at, 1700000000);
        assert_eq!(out.status.as_deref(), Some("completed"));
        assert_eq!(out.output.len(), 1);

        if let OutputItem::Message { id, role, content, .. } = &out.output[0] {
            assert_eq!(id, "msg_chatcmpl-abc123");
            assert_eq!(role, "assistant");
            assert_eq!(content[0].text(), Some("Hello!"));
        } else {
            panic!("Expected message output item");
        }

        let usage = out.usage.unwrap();
        assert_eq!(usage.input_tokens, 10);
        assert_eq!(usage.output_tokens, 20);
        assert_eq!(usage.total_tokens, 30);
    }

    #[test]
    fn test_round_trip_from_chat() {
        let original = simple_completion();
        let forward = chat_to_response_response(&original).unwrap();
        let back = response_to_chat_response(&forward.payload).unwrap();
        assert_eq!(back.payload, original);
        assert!(back.dropped_fields.is_empty());
    }

    #[test]
    fn test_tool_calls_become_function_call_items() {
        let original = completion(json!({
            "id": "chatcmpl-xyz",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "get_weather", "arguments": "{\"city\":\"London\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }));

        let out = chat_to_response_response(&original).unwrap().payload;
        assert_eq!(out.output.len(), 1);
        if let OutputItem::FunctionCall { call_id, name, arguments, .. } = &out.output[0] {
            assert_eq!(call_id, "call_abc");
            assert_eq!(name, "get_weather");
            assert_eq!(arguments, "{\"city\":\"London\"}");
        } else {
            panic!("Expected function_call output item");
        }

        let back = response_to_chat_response(&out).unwrap().payload;
        assert_eq!(back, original);
    }

    #[test]
    fn test_length_maps_to_incomplete() {
        let mut resp = simple_completion();
        resp.choices[0].finish_reason = Some("length".to_string());

        let out = chat_to_response_response(&resp).unwrap().payload;
        assert_eq!(out.status.as_deref(), Some("incomplete"));
        assert_eq!(
            out.incomplete_details,
            Some(IncompleteDetails {
                reason: "max_output_tokens".to_string()
            })
        );

        let back = response_to_chat_response(&out).unwrap().payload;
        assert_eq!(back.choices[0].finish_reason.as_deref(), Some("length"));
    }

    #[test]
    fn test_extra_choices_are_parked_and_restored() {
        let mut resp = simple_completion();
        let mut second = resp.choices[0].clone();
        second.index = 1;
        second.message.content = Some("Hi!".to_string());
        resp.choices.push(second);

        let forward = chat_to_response_response(&resp).unwrap();
        assert_eq!(forward.unmapped_fields, vec!["choices"]);
        assert_eq!(forward.payload.extra["choices"][0]["message"]["content"], json!("Hi!"));

        let back = response_to_chat_response(&forward.payload).unwrap().payload;
        assert_eq!(back, resp);
    }

    #[test]
    fn test_fresh_response_object_round_trip() {
        let (original, _) = ResponseObject::from_value(&json!({
            "id": "resp_1",
            "object": "response",
            "created_at": 42,
            "model": "o3",
            "status": "failed",
            "output": [{
                "type": "message",
                "id": "msg_custom",
                "role": "assistant",
                "status": "completed",
                "content": [{"type": "output_text", "text": "partial", "annotations": []}]
            }],
            "usage": {"input_tokens": 3, "output_tokens": 4, "total_tokens": 7,
                      "output_tokens_details": {"reasoning_tokens": 1}}
        }))
        .unwrap();

        let chat = response_to_chat_response(&original).unwrap();
        assert_eq!(chat.payload.extra["status"], json!("failed"));
        assert_eq!(chat.payload.choices[0].extra["id"], json!("msg_custom"));
        assert_eq!(
            chat.payload.usage.as_ref().unwrap().extra["output_tokens_details"],
            json!({"reasoning_tokens": 1})
        );

        let back = chat_to_response_response(&chat.payload).unwrap().payload;
        assert_eq!(back, original);
    }

    #[test]
    fn test_unsupported_output_items_are_reported() {
        let (original, _) = ResponseObject::from_value(&json!({
            "id": "resp_2",
            "object": "response",
            "created_at": 1,
            "model": "o3",
            "status": "completed",
            "output": [
                {"type": "reasoning", "id": "rs_1", "summary": []},
                {"type": "message", "id": "msg_resp_2", "role": "assistant",
                 "content": [{"type": "output_text", "text": "ok", "annotations": []}]}
            ]
        }))
        .unwrap();

        let chat = response_to_chat_response(&original).unwrap();
        assert_eq!(chat.dropped_fields, vec!["output[0]"]);
        assert_eq!(chat.payload.choices[0].message.content.as_deref(), Some("ok"));
        assert_eq!(chat.payload.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_item_details_chat_cannot_hold_are_reported() {
        let (original, _) = ResponseObject::from_value(&json!({
            "id": "resp_3",
            "object": "response",
            "created_at": 1,
            "model": "o3",
            "status": "completed",
            "output": [
                {"type": "message", "id": "msg_a", "role": "assistant", "status": "completed",
                 "content": [{"type": "output_text", "text": "Paris is the capital.",
                              "annotations": [{"type": "url_citation", "url": "https://example.org",
                                               "start_index": 0, "end_index": 5}]}]},
                {"type": "message", "id": "msg_b", "role": "assistant", "status": "incomplete",
                 "content": [{"type": "output_text", "text": " More later.", "annotations": []}]},
                {"type": "function_call", "id": "fc_1", "call_id": "call_1", "name": "f",
                 "arguments": "{}", "status": "completed"}
            ]
        }))
        .unwrap();

        let chat = response_to_chat_response(&original).unwrap();
        assert_eq!(
            chat.dropped_fields,
            vec![
                "output[0].content[0].annotations",
                "output[1].id",
                "output[1].status",
                "output[2].id",
            ]
        );
        assert_eq!(
            chat.payload.choices[0].message.content.as_deref(),
            Some("Paris is the capital. More later.")
        );
        assert_eq!(chat.payload.choices[0].extra["id"], json!("msg_a"));
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(status_for_finish_reason(Some("stop")).0, "completed");
        assert_eq!(status_for_finish_reason(Some("tool_calls")).0, "completed");
        assert_eq!(status_for_finish_reason(Some("length")).0, "incomplete");
        assert_eq!(status_for_finish_reason(None).0, "in_progress");
        assert_eq!(
            finish_reason_for_status(Some("completed"), None, true).as_deref(),
            Some("tool_calls")
        );
        assert_eq!(finish_reason_for_status(Some("in_progress"), None, false), None);
    }
}
