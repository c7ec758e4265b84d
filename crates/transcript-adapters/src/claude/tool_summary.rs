use serde_json::Value;

use transcript_types::text::truncate_chars;

const MAX_SUMMARY: usize = 100;

fn str_field<'a>(input: &'a Value, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str)
}

/// `file_path`, when the tool is one that operates on a single file
/// (Read/Write/Edit); copied onto the event's own `file_path` field too.
pub(crate) fn file_path_for(tool_name: &str, input: &Value) -> Option<String> {
    match tool_name {
        "Read" | "Write" | "Edit" => str_field(input, "file_path").map(str::to_string),
        _ => None,
    }
}

/// Human-readable summary of a `tool_use` content item's input, per tool name.
pub(crate) fn summarize(tool_name: &str, input: &Value) -> String {
    match tool_name {
        "Bash" => str_field(input, "command")
            .map(|c| truncate_chars(c, MAX_SUMMARY))
            .unwrap_or_default(),
        "Read" | "Write" | "Edit" => str_field(input, "file_path").unwrap_or_default().to_string(),
        "Glob" | "Grep" => str_field(input, "pattern").unwrap_or_default().to_string(),
        "WebFetch" => str_field(input, "url").unwrap_or_default().to_string(),
        "WebSearch" => str_field(input, "query").unwrap_or_default().to_string(),
        "Task" => {
            let subagent = str_field(input, "subagent_type").unwrap_or_default();
            let prompt = str_field(input, "prompt").unwrap_or_default();
            truncate_chars(&format!("[{}] {}", subagent, prompt), MAX_SUMMARY)
        }
        "TodoWrite" => "[todo list update]".to_string(),
        "AskUserQuestion" => {
            let n = input
                .get("questions")
                .and_then(Value::as_array)
                .map(|a| a.len())
                .unwrap_or(0);
            format!("[{} questions]", n)
        }
        _ => ["command", "path", "file_path", "pattern", "query", "url", "content"]
            .iter()
            .find_map(|key| str_field(input, key))
            .map(|s| truncate_chars(s, MAX_SUMMARY))
            .unwrap_or_default(),
    }
}
