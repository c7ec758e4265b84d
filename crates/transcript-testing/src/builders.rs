use serde_json::{Value, json};

/// Build a Claude `user` entry JSONL line carrying plain text content.
pub fn claude_user_text(uuid: &str, session_id: &str, text: &str) -> String {
    json!({
        "type": "user",
        "uuid": uuid,
        "sessionId": session_id,
        "timestamp": "2025-01-15T10:30:00.000Z",
        "message": { "role": "user", "content": text },
    })
    .to_string()
}

/// Build a Claude `user` entry carrying a `toolUseResult` payload.
pub fn claude_tool_use_result(uuid: &str, session_id: &str, result: Value) -> String {
    json!({
        "type": "user",
        "uuid": uuid,
        "sessionId": session_id,
        "timestamp": "2025-01-15T10:30:00.000Z",
        "toolUseResult": result,
    })
    .to_string()
}

/// Build a Claude `assistant` entry with a single content block of the given
/// `type` (`text`, `thinking`, ...). `field` names the text-bearing key.
pub fn claude_assistant_block(uuid: &str, session_id: &str, block_type: &str, field: &str, value: &str) -> String {
    let mut block = serde_json::Map::new();
    block.insert("type".to_string(), Value::String(block_type.to_string()));
    block.insert(field.to_string(), Value::String(value.to_string()));

    json!({
        "type": "assistant",
        "uuid": uuid,
        "sessionId": session_id,
        "timestamp": "2025-01-15T10:30:01.000Z",
        "message": {
            "role": "assistant",
            "model": "claude-test",
            "content": [ Value::Object(block) ],
        },
    })
    .to_string()
}

/// Build a Claude `assistant` entry emitting a `tool_use` content block.
pub fn claude_tool_use(uuid: &str, session_id: &str, tool_name: &str, input: Value) -> String {
    json!({
        "type": "assistant",
        "uuid": uuid,
        "sessionId": session_id,
        "timestamp": "2025-01-15T10:30:01.000Z",
        "message": {
            "role": "assistant",
            "model": "claude-test",
            "content": [ { "type": "tool_use", "id": "t1", "name": tool_name, "input": input } ],
        },
    })
    .to_string()
}

/// A lower-case, hyphenated v4-shaped UUID string. Not cryptographically
/// random; only meant to satisfy the discovery regex in tests.
pub fn fake_uuid(seed: u32) -> String {
    format!("{:08x}-0000-4000-8000-{:012x}", seed, seed as u64)
}
