use serde_json::Value;

use transcript_types::text::truncate_chars;

/// Outcome of decoding a `toolUseResult` value: the most format-polymorphic
/// surface in the Claude transcript format (see the module-level decoding
/// order below).
pub(crate) struct ToolResultDecoded {
    pub tool_name: Option<&'static str>,
    pub preview: String,
    pub content_length: Option<u64>,
    pub file_path: Option<String>,
}

fn decoded(tool_name: Option<&'static str>, preview: impl Into<String>) -> ToolResultDecoded {
    ToolResultDecoded {
        tool_name,
        preview: preview.into(),
        content_length: None,
        file_path: None,
    }
}

/// Decode `toolUseResult` per the fixed, order-sensitive rule set: first
/// matching branch wins.
pub(crate) fn decode_tool_use_result(value: &Value) -> ToolResultDecoded {
    // 1. bare JSON string
    if let Value::String(s) = value {
        return decoded(None, s.clone());
    }

    let Some(obj) = value.as_object() else {
        return decoded(None, fallback_snippet(value));
    };

    let has_type = obj.get("type").and_then(Value::as_str);

    // 2. stdout/no type -> Bash
    if has_type.is_none() && obj.contains_key("stdout") {
        let stdout = obj.get("stdout").and_then(Value::as_str).unwrap_or("");
        let stderr = obj.get("stderr").and_then(Value::as_str).unwrap_or("");
        let preview = if stdout.is_empty() && stderr.is_empty() {
            "(no output)".to_string()
        } else {
            format!("{}\n{}", stdout, stderr)
        };
        return decoded(Some("Bash"), preview);
    }

    // 3. type=text + file sub-object -> Read
    if has_type == Some("text") {
        if let Some(file) = obj.get("file").and_then(Value::as_object) {
            let path = file
                .get("filePath")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let num_lines = file.get("numLines").and_then(Value::as_u64).unwrap_or(0);
            let content_length = file
                .get("content")
                .and_then(Value::as_str)
                .map(|c| c.chars().count() as u64);
            return ToolResultDecoded {
                tool_name: Some("Read"),
                preview: format!("[{}] {} lines", path, num_lines),
                content_length,
                file_path: Some(path),
            };
        }
    }

    // 4. type=create -> Write
    if has_type == Some("create") {
        let path = file_path_of(obj);
        return ToolResultDecoded {
            tool_name: Some("Write"),
            preview: format!("Created {}", path),
            content_length: None,
            file_path: Some(path),
        };
    }

    // 5. type=update -> Edit
    if has_type == Some("update") {
        let path = file_path_of(obj);
        return ToolResultDecoded {
            tool_name: Some("Edit"),
            preview: format!("Updated {}", path),
            content_length: None,
            file_path: Some(path),
        };
    }

    // 6. type=delete
    if has_type == Some("delete") {
        let path = file_path_of(obj);
        return ToolResultDecoded {
            tool_name: None,
            preview: format!("Deleted {}", path),
            content_length: None,
            file_path: Some(path),
        };
    }

    // 7. newTodos/oldTodos -> TodoWrite
    if obj.contains_key("newTodos") || obj.contains_key("oldTodos") {
        let n = obj
            .get("newTodos")
            .and_then(Value::as_array)
            .map(|a| a.len())
            .unwrap_or(0);
        return decoded(Some("TodoWrite"), format!("Updated todos ({} items)", n));
    }

    // 8. filenames -> Glob
    if let Some(filenames) = obj.get("filenames").and_then(Value::as_array) {
        let preview = if filenames.is_empty() {
            "No files found".to_string()
        } else {
            format!("Found {} files", filenames.len())
        };
        return decoded(Some("Glob"), preview);
    }

    // 9. non-empty content string
    if let Some(content) = obj.get("content").and_then(Value::as_str) {
        if !content.is_empty() {
            return decoded(None, content.to_string());
        }
    }

    // 10. fallback
    decoded(None, fallback_snippet(value))
}

fn file_path_of(obj: &serde_json::Map<String, Value>) -> String {
    obj.get("filePath")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn fallback_snippet(value: &Value) -> String {
    let raw = value.to_string();
    truncate_chars(&raw, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_result() {
        let v = json!("boom: permission denied");
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, None);
        assert_eq!(d.preview, "boom: permission denied");
    }

    #[test]
    fn bash_stdout_stderr() {
        let v = json!({"stdout": "ok", "stderr": ""});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, Some("Bash"));
        assert_eq!(d.preview, "ok\n");
    }

    #[test]
    fn bash_empty_output() {
        let v = json!({"stdout": "", "stderr": ""});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.preview, "(no output)");
    }

    #[test]
    fn read_file_result() {
        let v = json!({"type": "text", "file": {"filePath": "/a.txt", "numLines": 3, "content": "abc"}});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, Some("Read"));
        assert_eq!(d.preview, "[/a.txt] 3 lines");
        assert_eq!(d.content_length, Some(3));
        assert_eq!(d.file_path.as_deref(), Some("/a.txt"));
    }

    #[test]
    fn write_create_result() {
        let v = json!({"type": "create", "filePath": "/b.txt"});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, Some("Write"));
        assert_eq!(d.preview, "Created /b.txt");
    }

    #[test]
    fn edit_update_result() {
        let v = json!({"type": "update", "filePath": "/c.txt"});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, Some("Edit"));
        assert_eq!(d.preview, "Updated /c.txt");
    }

    #[test]
    fn delete_result_has_no_tool_name() {
        let v = json!({"type": "delete", "filePath": "/d.txt"});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, None);
        assert_eq!(d.preview, "Deleted /d.txt");
    }

    #[test]
    fn todo_write_result() {
        let v = json!({"newTodos": [{"id": 1}, {"id": 2}], "oldTodos": []});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, Some("TodoWrite"));
        assert_eq!(d.preview, "Updated todos (2 items)");
    }

    #[test]
    fn glob_result_found() {
        let v = json!({"filenames": ["a", "b"]});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, Some("Glob"));
        assert_eq!(d.preview, "Found 2 files");
    }

    #[test]
    fn glob_result_empty() {
        let v = json!({"filenames": []});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.preview, "No files found");
    }

    #[test]
    fn generic_content_fallback() {
        let v = json!({"content": "generic output"});
        let d = decode_tool_use_result(&v);
        assert_eq!(d.tool_name, None);
        assert_eq!(d.preview, "generic output");
    }

    #[test]
    fn unrecognized_shape_uses_raw_snippet() {
        let v = json!({"weird": 1});
        let d = decode_tool_use_result(&v);
        assert!(d.preview.contains("weird"));
    }
}
