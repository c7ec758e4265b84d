mod schema;
mod timestamp;
mod tool_result;
mod tool_summary;

use transcript_types::{EventType, ParsedEvent, RawEntry, ToolSuccess};

use crate::adapter::Adapter;
use crate::error::{Error, Result};
use crate::event_id;
use schema::{AssistantRecord, ContentItem, SummaryRecord, SystemRecord, TranscriptEntry, UserRecord};
use timestamp::parse_timestamp;

/// Parses Claude Code's `.jsonl` transcript format.
#[derive(Debug, Default)]
pub struct ClaudeAdapter;

impl ClaudeAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for ClaudeAdapter {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn parse_entry(&self, raw: &RawEntry) -> Result<Vec<ParsedEvent>> {
        let text = raw
            .as_str()
            .map_err(|e| Error::MalformedEntry(format!("invalid utf-8: {}", e)))?;
        let entry: TranscriptEntry = serde_json::from_str(text)?;

        Ok(match entry {
            TranscriptEntry::User(record) => user_events(record, &raw.bytes),
            TranscriptEntry::Assistant(record) => assistant_events(record, &raw.bytes),
            TranscriptEntry::Summary(record) => vec![summary_event(record, &raw.bytes)],
            TranscriptEntry::System(record) => vec![system_event(record, &raw.bytes)],
            TranscriptEntry::Unknown => Vec::new(),
        })
    }
}

fn user_events(record: UserRecord, raw_payload: &[u8]) -> Vec<ParsedEvent> {
    let timestamp = parse_timestamp(record.timestamp.as_deref());
    let session_id = record.session_id.clone().unwrap_or_default();

    if let Some(tool_use_result) = &record.tool_use_result {
        let decoded = tool_result::decode_tool_use_result(tool_use_result);
        let mut event = base_event(&session_id, EventType::ToolResult, timestamp, &record.uuid, &record.parent_uuid, &record.request_id, raw_payload);
        event.tool_name = decoded.tool_name.map(str::to_string);
        event.tool_success = Some(ToolSuccess::Success);
        event.file_path = decoded.file_path;
        if let Some(len) = decoded.content_length {
            event.content_length = len;
            event.content_preview = Some(decoded.preview);
        } else {
            event.set_content(&decoded.preview);
        }
        return vec![event];
    }

    if let Some(message) = &record.message {
        if let Some(item) = message.content.iter().find(|c| matches!(c, ContentItem::ToolResult { .. })) {
            if let ContentItem::ToolResult { content, is_error, .. } = item {
                let mut event = base_event(&session_id, EventType::ToolResult, timestamp, &record.uuid, &record.parent_uuid, &record.request_id, raw_payload);
                event.tool_success = Some(if *is_error { ToolSuccess::Failure } else { ToolSuccess::Success });
                let preview = content
                    .as_ref()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default();
                if *is_error {
                    event.tool_error = Some(preview.clone());
                }
                event.set_content(&preview);
                return vec![event];
            }
        }
    }

    let mut event = base_event(&session_id, EventType::UserPrompt, timestamp, &record.uuid, &record.parent_uuid, &record.request_id, raw_payload);
    event.is_human_input = !record.is_sidechain;
    if let Some(message) = &record.message {
        let text = joined_text(&message.content);
        event.set_content(&text);
    }
    vec![event]
}

fn assistant_events(record: AssistantRecord, raw_payload: &[u8]) -> Vec<ParsedEvent> {
    let timestamp = parse_timestamp(record.timestamp.as_deref());
    let session_id = record.session_id.clone().unwrap_or_default();

    let model = record.message.as_ref().and_then(|m| m.model.clone());
    let stop_reason = record.message.as_ref().and_then(|m| m.stop_reason.clone());
    let usage = record.message.as_ref().and_then(|m| m.usage.as_ref());

    let make_base = |event_type: EventType| {
        let mut event = base_event(&session_id, event_type, timestamp, &record.uuid, &record.parent_uuid, &record.request_id, raw_payload);
        event.model = model.clone();
        event.stop_reason = stop_reason.clone();
        if let Some(usage) = usage {
            event.input_tokens = usage.input_tokens;
            event.output_tokens = usage.output_tokens;
            event.cache_read_tokens = usage.cache_read_input_tokens;
            event.cache_create_tokens = usage.cache_creation_input_tokens;
        }
        event
    };

    let content = record.message.as_ref().map(|m| &m.content[..]).unwrap_or(&[]);
    if content.is_empty() {
        return vec![make_base(EventType::AiOutput)];
    }

    let mut events = Vec::with_capacity(content.len());
    for item in content {
        match item {
            ContentItem::Thinking { thinking } => {
                let mut event = make_base(EventType::Thinking);
                event.set_content(thinking);
                events.push(event);
            }
            ContentItem::Text { text } => {
                let mut event = make_base(EventType::AiOutput);
                event.set_content(text);
                events.push(event);
            }
            ContentItem::ToolUse { name, input, .. } => {
                let mut event = make_base(EventType::ToolUse);
                event.tool_name = Some(name.clone());
                event.set_tool_input_summary(tool_summary::summarize(name, input));
                event.file_path = tool_summary::file_path_for(name, input);
                events.push(event);
            }
            ContentItem::ToolResult { content, is_error, .. } => {
                let mut event = make_base(EventType::ToolResult);
                event.tool_success = Some(if *is_error { ToolSuccess::Failure } else { ToolSuccess::Success });
                let preview = content
                    .as_ref()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default();
                if *is_error {
                    event.tool_error = Some(preview.clone());
                }
                event.set_content(&preview);
                events.push(event);
            }
            ContentItem::Image { .. } | ContentItem::Unknown => {}
        }
    }

    if events.is_empty() {
        events.push(make_base(EventType::AiOutput));
    }
    events
}

fn summary_event(record: SummaryRecord, raw_payload: &[u8]) -> ParsedEvent {
    let timestamp = parse_timestamp(record.timestamp.as_deref());
    let session_id = record.session_id.clone().unwrap_or_default();
    let mut event = base_event(&session_id, EventType::SessionEnd, timestamp, &record.uuid, &None, &None, raw_payload);
    if let Some(summary) = &record.summary {
        event.set_content(summary);
    }
    event
}

fn system_event(record: SystemRecord, raw_payload: &[u8]) -> ParsedEvent {
    let timestamp = parse_timestamp(record.timestamp.as_deref());
    let session_id = record.session_id.clone().unwrap_or_default();
    let mut event = base_event(&session_id, EventType::Error, timestamp, &record.uuid, &None, &None, raw_payload);
    if let Some(content) = &record.content {
        event.set_content(content);
        event.tool_error = Some(content.clone());
    }
    event
}

fn base_event(
    session_id: &str,
    event_type: EventType,
    timestamp: chrono::DateTime<chrono::Utc>,
    message_uuid: &Option<String>,
    parent_uuid: &Option<String>,
    request_id: &Option<String>,
    raw_payload: &[u8],
) -> ParsedEvent {
    let mut event = ParsedEvent::new(event_id::generate(timestamp), session_id, event_type, timestamp);
    event.message_uuid = message_uuid.clone();
    event.parent_uuid = parent_uuid.clone();
    event.request_id = request_id.clone();
    event.raw_payload = raw_payload.to_vec();
    event
}

fn joined_text(content: &[ContentItem]) -> String {
    content
        .iter()
        .filter_map(|item| match item {
            ContentItem::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Vec<ParsedEvent> {
        let raw = RawEntry::new(1, line.as_bytes().to_vec(), None);
        ClaudeAdapter::new().parse_entry(&raw).unwrap()
    }

    #[test]
    fn user_prompt_from_plain_text() {
        let events = parse(
            r#"{"type":"user","uuid":"u1","sessionId":"s1","timestamp":"2025-01-15T10:30:00.000Z","message":{"role":"user","content":[{"type":"text","text":"Hi"}]}}"#,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::UserPrompt);
        assert!(events[0].is_human_input);
        assert_eq!(events[0].message_uuid.as_deref(), Some("u1"));
        assert_eq!(events[0].content_preview.as_deref(), Some("Hi"));
        assert_eq!(events[0].content_length, 2);
    }

    #[test]
    fn sidechain_user_prompt_is_not_human_input() {
        let events = parse(
            r#"{"type":"user","uuid":"u1","sessionId":"s1","isSidechain":true,"message":{"role":"user","content":"Hi"}}"#,
        );
        assert!(!events[0].is_human_input);
    }

    #[test]
    fn assistant_thinking_then_text_yields_two_events() {
        let events = parse(
            r#"{"type":"assistant","uuid":"a1","sessionId":"s1","message":{"role":"assistant","content":[{"type":"thinking","thinking":"let me think"},{"type":"text","text":"done"}]}}"#,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::Thinking);
        assert_eq!(events[1].event_type, EventType::AiOutput);
    }

    #[test]
    fn assistant_empty_content_yields_single_ai_output() {
        let events = parse(r#"{"type":"assistant","uuid":"a1","sessionId":"s1","message":{"role":"assistant","content":[]}}"#);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::AiOutput);
    }

    #[test]
    fn bash_tool_use_result_on_user_entry() {
        let events = parse(
            r#"{"type":"user","uuid":"u1","sessionId":"s1","toolUseResult":{"stdout":"hello\n","stderr":""}}"#,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::ToolResult);
        assert_eq!(events[0].tool_name.as_deref(), Some("Bash"));
        assert_eq!(events[0].tool_success, Some(ToolSuccess::Success));
        assert!(events[0].content_preview.as_ref().unwrap().starts_with("hello"));
    }

    #[test]
    fn tool_use_content_item_summarizes_bash_command() {
        let events = parse(
            r#"{"type":"assistant","uuid":"a1","sessionId":"s1","message":{"role":"assistant","content":[{"type":"tool_use","id":"t1","name":"Bash","input":{"command":"ls"}}]}}"#,
        );
        assert_eq!(events[0].event_type, EventType::ToolUse);
        assert_eq!(events[0].tool_name.as_deref(), Some("Bash"));
        assert_eq!(events[0].tool_input_summary.as_deref(), Some("ls"));
    }

    #[test]
    fn summary_entry_yields_session_end() {
        let events = parse(r#"{"type":"summary","sessionId":"s1","summary":"wrapped up"}"#);
        assert_eq!(events[0].event_type, EventType::SessionEnd);
    }

    #[test]
    fn system_entry_yields_error() {
        let events = parse(r#"{"type":"system","sessionId":"s1","content":"disk full"}"#);
        assert_eq!(events[0].event_type, EventType::Error);
        assert_eq!(events[0].tool_error.as_deref(), Some("disk full"));
    }

    #[test]
    fn unknown_type_yields_no_events() {
        let events = parse(r#"{"type":"queue-operation","sessionId":"s1"}"#);
        assert!(events.is_empty());
    }

    #[test]
    fn event_retains_the_entry_raw_bytes_for_replay() {
        let line = r#"{"type":"user","uuid":"u1","sessionId":"s1","message":{"role":"user","content":"Hi"}}"#;
        let events = parse(line);
        assert_eq!(events[0].raw_payload, line.as_bytes());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let raw = RawEntry::new(1, b"not json".to_vec(), None);
        let result = ClaudeAdapter::new().parse_entry(&raw);
        assert!(result.is_err());
    }
}
