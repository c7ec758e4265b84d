use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::truncate_chars;

const MAX_CONTENT_PREVIEW: usize = 500;
const MAX_TOOL_INPUT_SUMMARY: usize = 100;

/// Classification of a normalized AI transcript event.
///
/// Variants correspond 1:1 to the adapter-independent event vocabulary: every
/// [`Adapter`](crate placeholder, see transcript-adapters) maps its source-specific
/// shapes onto this set, never invents a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
    SessionEnd,
    UserPrompt,
    Thinking,
    AiOutput,
    Streaming,
    ToolUse,
    ToolResult,
    ToolBlocked,
    Error,
    Stop,
    SubagentStart,
    SubagentStop,
}

/// Tri-state tool outcome. `None` on [`ParsedEvent::tool_success`] stands for
/// "not applicable" (the event isn't a tool_result at all); this variant set
/// only distinguishes success from failure once a result exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSuccess {
    Success,
    Failure,
}

/// The complete, adapter-independent record of one semantic AI event.
///
/// Constructed exclusively through [`ParsedEvent::new`] plus the `with_*`/`set_*`
/// helpers below, which enforce the length invariants ([`MAX_CONTENT_PREVIEW`],
/// [`MAX_TOOL_INPUT_SUMMARY`]) at the single choke point where content enters a
/// event, rather than leaving every adapter to truncate by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedEvent {
    // Identity
    pub event_id: String,
    pub session_id: String,

    // Conversation structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    // Classification
    pub event_type: EventType,
    pub is_human_input: bool,

    // Temporal
    pub timestamp: DateTime<Utc>,

    // Model/usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub input_tokens: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub output_tokens: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub cache_read_tokens: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub cache_create_tokens: u64,

    // Tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_input_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_success: Option<ToolSuccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    // Content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub content_length: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub raw_payload: Vec<u8>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl ParsedEvent {
    /// Build a minimal event; everything beyond identity/classification/timestamp
    /// defaults to empty/zero and is filled in by the adapter via the `with_*`
    /// helpers or direct field assignment.
    pub fn new(event_id: impl Into<String>, session_id: impl Into<String>, event_type: EventType, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id: event_id.into(),
            session_id: session_id.into(),
            message_uuid: None,
            parent_uuid: None,
            request_id: None,
            event_type,
            is_human_input: false,
            timestamp,
            model: None,
            stop_reason: None,
            input_tokens: 0,
            output_tokens: 0,
            cache_read_tokens: 0,
            cache_create_tokens: 0,
            tool_name: None,
            tool_input_summary: None,
            tool_success: None,
            tool_error: None,
            file_path: None,
            content_preview: None,
            content_length: 0,
            raw_payload: Vec::new(),
        }
    }

    /// Set `content_preview`/`content_length` from the full original content,
    /// truncating the preview to the invariant-mandated 500 chars.
    pub fn set_content(&mut self, content: &str) {
        self.content_length = content.chars().count() as u64;
        self.content_preview = Some(truncate_chars(content, MAX_CONTENT_PREVIEW));
    }

    /// Set `tool_input_summary`, truncating to the invariant-mandated 100 chars.
    pub fn set_tool_input_summary(&mut self, summary: impl AsRef<str>) {
        let summary = summary.as_ref();
        if summary.is_empty() {
            self.tool_input_summary = None;
        } else {
            self.tool_input_summary = Some(truncate_chars(summary, MAX_TOOL_INPUT_SUMMARY));
        }
    }
}
