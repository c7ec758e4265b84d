/// Truncate `s` to at most `max` chars, appending a single ellipsis character
/// in place of the last char when truncation actually occurs. The result is
/// always `<= max` chars, which is what callers rely on to satisfy the
/// `content_preview`/`tool_input_summary` length invariants.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max - 1).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_passes_through() {
        assert_eq!(truncate_chars("Hi", 500), "Hi");
    }

    #[test]
    fn long_string_truncates_with_ellipsis() {
        let long = "a".repeat(600);
        let result = truncate_chars(&long, 500);
        assert_eq!(result.chars().count(), 500);
        assert!(result.ends_with('…'));
    }

    #[test]
    fn exact_length_is_not_truncated() {
        let s = "a".repeat(100);
        assert_eq!(truncate_chars(&s, 100), s);
    }
}
