use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};

use crate::error::{Error, Result};

/// Max bytes a single line may grow to before it's considered unrecoverable
/// and dropped.
const LINE_BUDGET: usize = 1024 * 1024;

/// A single transcript file currently being tailed, owned exclusively by its
/// Transcript Watcher's poll loop. Tracks a byte-offset cursor implicitly via
/// the underlying reader and buffers a partial trailing line across ticks.
pub(crate) struct ActiveFile {
    path: PathBuf,
    reader: BufReader<File>,
    pending: Vec<u8>,
}

impl ActiveFile {
    pub(crate) async fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            pending: Vec::new(),
        })
    }

    pub(crate) fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Read every complete line currently available without blocking on new
    /// writer activity. Returns the complete lines (newline stripped);
    /// a trailing partial line, if any, is retained in `pending` for the
    /// next tick. Oversized lines are dropped and reported as `FileReadError`.
    pub(crate) async fn read_available_lines(&mut self) -> (Vec<Vec<u8>>, Vec<Error>) {
        let mut lines = Vec::new();
        let mut errors = Vec::new();
        let mut chunk = [0u8; 8192];

        loop {
            let n = match self.reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => {
                    errors.push(Error::FileReadError(err));
                    break;
                }
            };

            let mut start = 0;
            for (i, byte) in chunk[..n].iter().enumerate() {
                if *byte == b'\n' {
                    self.pending.extend_from_slice(&chunk[start..i]);
                    lines.push(std::mem::take(&mut self.pending));
                    start = i + 1;
                }
            }
            self.pending.extend_from_slice(&chunk[start..n]);

            if self.pending.len() > LINE_BUDGET {
                errors.push(Error::FileReadError(std::io::Error::other(format!(
                    "line in {} exceeded {} byte budget, dropping",
                    self.path.display(),
                    LINE_BUDGET
                ))));
                self.pending.clear();
            }
        }

        (lines, errors)
    }
}
