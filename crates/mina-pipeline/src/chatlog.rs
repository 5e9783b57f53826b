use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;

/// Best-effort durable audit trail of (query, response) pairs.
///
/// One JSON object per line, newline-terminated. No rotation, no format
/// versioning.
pub struct ChatLogAppender {
    path: PathBuf,
}

#[derive(Serialize)]
struct ChatLogEntry<'a> {
    prompt: &'a str,
    completion: &'a str,
}

impl ChatLogAppender {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one entry. Errors surface to the caller, which logs and
    /// swallows them; a failed append never affects delivery.
    pub async fn append(&self, prompt: &str, completion: &str) -> std::io::Result<()> {
        let mut line = serde_json::to_string(&ChatLogEntry { prompt, completion })
            .map_err(std::io::Error::other)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatlog.json");
        let log = ChatLogAppender::new(&path);

        log.append("what is rust", "a systems language").await.unwrap();
        log.append("and tokio?", "an async runtime").await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["prompt"], "what is rust");
        assert_eq!(first["completion"], "a systems language");
        assert!(content.ends_with('\n'));
    }

    #[tokio::test]
    async fn creates_the_file_on_first_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");
        assert!(!path.exists());

        ChatLogAppender::new(&path).append("q", "a").await.unwrap();
        assert!(path.exists());
    }
}
