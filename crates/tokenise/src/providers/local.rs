//! Fill-mask with a locally loaded ModernBERT checkpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mask_resolver::MaskedSentence;
use masked_lm::{MaskedLanguageModel, MODEL_FILES};
use std::path::PathBuf;
use tokio::sync::RwLock;

use super::{Prediction, PredictionProvider};
use crate::config::Config;
use crate::download::{download_repo_files, optimize_tokenizer};

/// Runs the masked language model in-process.
///
/// The model is downloaded and loaded on first use.
pub struct LocalProvider {
    model: MaskedLanguageModel,
    repo: String,
    model_dir: PathBuf,
    top_k: usize,
    /// Whether the model is loaded
    model_loaded: RwLock<bool>,
}

impl LocalProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            model: MaskedLanguageModel::new(),
            repo: config.local_model.clone(),
            model_dir: config.repo_dir(&config.local_model),
            top_k: config.top_k,
            model_loaded: RwLock::new(false),
        }
    }

    /// Download the model if not present and load it.
    ///
    /// Holds the write lock for the whole operation so concurrent callers
    /// never load twice.
    pub async fn initialize(&self) -> Result<()> {
        let mut loaded = self.model_loaded.write().await;
        if *loaded {
            return Ok(());
        }
        if self.model.is_loaded() {
            *loaded = true;
            return Ok(());
        }

        download_repo_files(&self.repo, MODEL_FILES, &self.model_dir).await?;
        optimize_tokenizer(&self.model_dir).await?;

        self.model
            .load_model_from_dir(&self.model_dir)
            .with_context(|| format!("Failed to load {}", self.repo))?;

        *loaded = true;
        tracing::info!("Local model {} ready", self.repo);
        Ok(())
    }

    async fn ensure_loaded(&self) -> Result<()> {
        if !*self.model_loaded.read().await {
            self.initialize().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PredictionProvider for LocalProvider {
    fn name(&self) -> &str {
        &self.repo
    }

    async fn predict(&self, sentence: &MaskedSentence) -> Result<Prediction> {
        self.ensure_loaded().await?;

        let predictions = self.model.predict(sentence, self.top_k)?;
        let raw = serde_json::to_value(&predictions)?;

        Ok(Prediction { predictions, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_config_cache_layout() {
        let config = Config::from_lookup(|key| match key {
            "TOKENISE_CACHE_DIR" => Some("/tmp/tokenise-cache".to_string()),
            "TOKENISE_TOP_K" => Some("3".to_string()),
            _ => None,
        })
        .unwrap();

        let provider = LocalProvider::new(&config);
        assert_eq!(provider.name(), "answerdotai/ModernBERT-base");
        assert_eq!(
            provider.model_dir,
            PathBuf::from("/tmp/tokenise-cache/answerdotai--ModernBERT-base")
        );
        assert_eq!(provider.top_k, 3);
    }

    #[tokio::test]
    #[ignore] // Downloads ~600MB. Run with: cargo test -p tokenise local_provider -- --ignored
    async fn test_local_provider_end_to_end() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cache = temp_dir.path().to_string_lossy().to_string();
        let config = Config::from_lookup(move |key| match key {
            "TOKENISE_CACHE_DIR" => Some(cache.clone()),
            _ => None,
        })
        .unwrap();

        let provider = LocalProvider::new(&config);
        let sentence = MaskedSentence::parse("The capital of France is <mask>.", "<mask>").unwrap();
        let prediction = provider.predict(&sentence).await.unwrap();

        assert_eq!(prediction.predictions.len(), 1);
        assert!(prediction.raw.is_array());
    }
}
