//! Tokenizer and model downloads from Hugging Face.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Hugging Face Hub file host
const HUB_URL: &str = "https://huggingface.co";

/// Files below this size are treated as failed or truncated downloads.
const MIN_VALID_SIZE: u64 = 100;

/// Download `files` from the `repo` model repository into `dest_dir`.
///
/// Files that are already present are kept. Returns the path to the directory.
pub async fn download_repo_files(repo: &str, files: &[&str], dest_dir: &Path) -> Result<PathBuf> {
    // Create the repository directory if needed
    if !dest_dir.exists() {
        fs::create_dir_all(dest_dir).await?;
        tracing::info!("Created model directory: {}", dest_dir.display());
    }

    if check_files(dest_dir, files).await {
        tracing::debug!("{} already downloaded", repo);
        return Ok(dest_dir.to_path_buf());
    }

    tracing::info!("Downloading {} from Hugging Face...", repo);

    for file in files {
        let dest_path = dest_dir.join(file);

        // Skip if already exists and is valid
        if dest_path.exists() {
            let metadata = fs::metadata(&dest_path).await?;
            if metadata.len() > MIN_VALID_SIZE {
                tracing::debug!("{} already exists, skipping", file);
                continue;
            }
            // Remove invalid file
            fs::remove_file(&dest_path).await?;
        }

        let url = file_url(repo, file);
        tracing::info!("Downloading {}...", file);

        download_file(&url, &dest_path)
            .await
            .with_context(|| format!("Failed to download {} from {}", file, repo))?;
    }

    tracing::info!("Download of {} complete", repo);
    Ok(dest_dir.to_path_buf())
}

fn file_url(repo: &str, file: &str) -> String {
    format!("{}/{}/resolve/main/{}", HUB_URL, repo, file)
}

/// Check if all files exist and are valid.
async fn check_files(dir: &Path, files: &[&str]) -> bool {
    for file in files {
        let path = dir.join(file);
        match fs::metadata(&path).await {
            Ok(meta) if meta.len() > MIN_VALID_SIZE => continue,
            _ => return false,
        }
    }
    true
}

/// Download a single file with redirect handling.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("HTTP error downloading {}", url))?;

    let total_size = response.content_length();
    let mut stream = response.bytes_stream();

    // Stream into a sibling file so an interrupted download never looks complete
    let partial = dest.with_extension("part");
    let mut file = File::create(&partial).await?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        // Log progress for large files
        if let Some(total) = total_size {
            if total > 1_000_000 && downloaded % 10_000_000 < chunk.len() as u64 {
                let percent = (downloaded as f64 / total as f64) * 100.0;
                tracing::info!("  Progress: {:.1}%", percent);
            }
        }
    }

    file.flush().await?;
    drop(file);
    fs::rename(&partial, dest).await?;
    Ok(())
}

/// Remove fixed padding configuration from tokenizer.json.
///
/// Some checkpoints ship `padding: { strategy: { Fixed: N } }`, which would
/// pad every sentence to N tokens. Fill-mask runs one unpadded sequence, so
/// the block is dropped before the tokenizer is loaded.
pub async fn optimize_tokenizer(model_dir: &Path) -> Result<()> {
    let tokenizer_path = model_dir.join("tokenizer.json");

    let content = fs::read_to_string(&tokenizer_path).await?;
    let mut data: serde_json::Value = serde_json::from_str(&content)?;

    let has_padding = data.get("padding").is_some_and(|padding| !padding.is_null());
    if has_padding {
        tracing::info!("Optimizing tokenizer.json - removing fixed padding configuration");

        if let Some(obj) = data.as_object_mut() {
            obj.remove("padding");
        }

        let optimized = serde_json::to_string_pretty(&data)?;
        fs::write(&tokenizer_path, optimized).await?;
    } else {
        tracing::debug!("Tokenizer already optimized");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_check_files_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!check_files(temp_dir.path(), &["tokenizer.json"]).await);
    }

    #[tokio::test]
    async fn test_check_files_rejects_truncated_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("tokenizer.json"), "{}").await.unwrap();
        assert!(!check_files(temp_dir.path(), &["tokenizer.json"]).await);

        fs::write(temp_dir.path().join("tokenizer.json"), "x".repeat(200))
            .await
            .unwrap();
        assert!(check_files(temp_dir.path(), &["tokenizer.json"]).await);
    }

    #[tokio::test]
    async fn test_present_files_are_not_downloaded_again() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("tokenizer.json"), "x".repeat(200))
            .await
            .unwrap();

        // No network access needed: every file is already valid
        let dir = download_repo_files("gpt2", &["tokenizer.json"], temp_dir.path())
            .await
            .unwrap();
        assert_eq!(dir, temp_dir.path());
    }

    #[test]
    fn test_file_url() {
        assert_eq!(
            file_url("answerdotai/ModernBERT-base", "config.json"),
            "https://huggingface.co/answerdotai/ModernBERT-base/resolve/main/config.json"
        );
    }

    #[tokio::test]
    async fn test_optimize_tokenizer_removes_padding() {
        let temp_dir = TempDir::new().unwrap();
        let tokenizer_path = temp_dir.path().join("tokenizer.json");

        // Create a tokenizer with padding config
        let tokenizer_json = r#"{
            "version": "1.0",
            "padding": {
                "strategy": { "Fixed": 128 }
            },
            "model": {}
        }"#;
        fs::write(&tokenizer_path, tokenizer_json).await.unwrap();

        optimize_tokenizer(temp_dir.path()).await.unwrap();

        // Check padding was removed
        let content = fs::read_to_string(&tokenizer_path).await.unwrap();
        let data: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(data.get("padding").is_none());
        assert!(data.get("version").is_some()); // Other fields preserved
    }

    #[tokio::test]
    async fn test_optimize_tokenizer_leaves_null_padding_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let tokenizer_path = temp_dir.path().join("tokenizer.json");
        let original = r#"{"version":"1.0","padding":null}"#;
        fs::write(&tokenizer_path, original).await.unwrap();

        optimize_tokenizer(temp_dir.path()).await.unwrap();

        assert_eq!(fs::read_to_string(&tokenizer_path).await.unwrap(), original);
    }
}
