//! Persistence of raw predictions to a single JSON file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes each new set of predictions over the previous one.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `value` with 4-space indentation and overwrite the file.
    pub async fn save<T: Serialize>(&self, value: &T) -> Result<&Path> {
        let json = to_pretty_json(value)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::debug!("Saved predictions to {}", self.path.display());
        Ok(&self.path)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_creates_parent_and_indents() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonSink::new(temp_dir.path().join("q1/predictions.json"));

        let path = sink.save(&json!([{"score": 0.5}])).await.unwrap().to_path_buf();

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "[\n    {\n        \"score\": 0.5\n    }\n]");
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_predictions() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonSink::new(temp_dir.path().join("predictions.json"));

        sink.save(&json!(["first", "second", "third"])).await.unwrap();
        sink.save(&json!(["only"])).await.unwrap();

        let content = fs::read_to_string(sink.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value, json!(["only"]));
    }
}
