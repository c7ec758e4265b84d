use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Append `line` plus a trailing newline to `path`, creating the file if absent.
pub fn append_line(path: &Path, line: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .expect("open fixture file for append");
    writeln!(file, "{}", line).expect("write fixture line");
}

/// Write `lines` to a fresh file at `dir/name`, one per line.
pub fn write_jsonl(dir: &Path, name: &str, lines: &[String]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n") + "\n").expect("write jsonl fixture");
    path
}
