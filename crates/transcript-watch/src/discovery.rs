use std::sync::OnceLock;

use regex::Regex;

/// Lower-case hex UUID `.jsonl` filename, per the discovery contract: exactly
/// the 8-4-4-4-12 pattern followed by the `.jsonl` suffix.
pub(crate) fn uuid_jsonl_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\.jsonl$")
            .expect("uuid regex is valid")
    })
}

pub(crate) fn is_uuid_jsonl(name: &str) -> bool {
    uuid_jsonl_regex().is_match(name)
}
