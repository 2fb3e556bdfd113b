//! Demonstrate using the translation layer without a server.
//!
//! Usage:
//!   `cargo run --example translate_only`

use dialect_bridge::translate::chat_types::{ChatCompletion, ChatCompletionsRequest};
use dialect_bridge::translate::dialect::{resolve_direction, ApiType, PayloadKind, Resolution};
use dialect_bridge::translate::request::chat_to_response;
use dialect_bridge::translate::response::response_to_chat_response;
use dialect_bridge::translate::response_types::ResponseObject;
use dialect_bridge::translate::roundtrip;
use dialect_bridge::{ModelMapping, ModelRouter};
use serde_json::json;

fn main() -> dialect_bridge::Result<()> {
    // A Chat Completions client talking to a model whose backend speaks the Response API
    let mut mapping = ModelMapping::new();
    mapping.insert("o3".to_string(), ApiType::Response);
    let router = ModelRouter::new(mapping);

    let raw = json!({
        "model": "o3",
        "messages": [
            {"role": "system", "content": "You are a geography expert. Be concise."},
            {"role": "user", "content": "What is the capital of France?"},
            {"role": "assistant", "content": "Paris."},
            {"role": "user", "content": "And Germany?"}
        ],
        "max_tokens": 1024,
        "temperature": 0.7,
        "frequency_penalty": 0.2,
        "seed": 7
    });

    let backend = router.resolve("o3")?;
    let resolution = resolve_direction(ApiType::ChatCompletions, backend, PayloadKind::Request);
    println!("=== Resolution: {:?} ===", resolution);

    let (chat_req, unknown) = ChatCompletionsRequest::from_value(&raw)?;
    let translated = chat_to_response(&chat_req)?;

    println!("=== Translated Request (Response format) ===");
    println!("{}", serde_json::to_string_pretty(&translated.payload)?);
    println!("  unknown fields:  {:?}", unknown.unknown_fields);
    println!("  unmapped fields: {:?}", translated.unmapped_fields);

    // Simulate the backend's reply and translate it back for the client
    let backend_reply = json!({
        "id": "resp_demo",
        "object": "response",
        "created_at": 0,
        "model": "o3",
        "status": "completed",
        "output": [
            {"type": "reasoning", "id": "rs_1", "summary": []},
            {"type": "message", "id": "msg_resp_demo", "role": "assistant", "status": "completed",
             "content": [{"type": "output_text", "text": "Berlin.", "annotations": []}]}
        ],
        "usage": {"input_tokens": 42, "output_tokens": 3, "total_tokens": 45}
    });

    let (response_obj, _) = ResponseObject::from_value(&backend_reply)?;
    let chat_reply = response_to_chat_response(&response_obj)?;

    println!();
    println!("=== Translated Response (Chat Completions format) ===");
    println!("{}", serde_json::to_string_pretty(&chat_reply.payload)?);
    println!("  dropped: {:?}", chat_reply.dropped_fields);

    // Check the request survives a round trip
    if let Resolution::Translate(direction) = resolution {
        let result = roundtrip::verify(&raw, direction);
        println!();
        println!("=== Round Trip ({}) ===", direction);
        println!("  success:     {}", result.success);
        println!("  equivalence: {:?}", result.semantic_equivalence);
        for difference in &result.differences {
            println!("  - {}", difference);
        }
    }

    // Typed access still works after translation
    let reparsed: ChatCompletion = serde_json::from_value(serde_json::to_value(&chat_reply.payload)?)?;
    println!();
    println!(
        "Done! Reply for the client: {:?}",
        reparsed.choices.first().and_then(|c| c.message.content.as_deref())
    );

    Ok(())
}
