#![deny(clippy::all)]

mod model;
pub mod tokenization;

// Re-export for external use
pub use model::{ModelManager, MASK_TOKEN};
pub use tokenization::{TokenizationReport, ANALYSIS_SENTENCE, COMPARED_TOKENIZERS};

use mask_resolver::{MaskedSentence, PredictionSet};
use std::path::Path;
use tokenizers::Tokenizer;

/// Files a local fill-mask model directory must contain.
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Local fill-mask predictor.
///
/// Wraps ModelManager with a convenient API for loading models from files
/// and predicting blanks.
///
/// # Example
/// ```ignore
/// use masked_lm::MaskedLanguageModel;
/// use mask_resolver::MaskedSentence;
/// use std::path::Path;
///
/// let model = MaskedLanguageModel::new();
/// model.load_model_from_dir(Path::new("models/ModernBERT-base"))?;
///
/// let sentence = MaskedSentence::parse("The capital of France is <mask>.", "<mask>")?;
/// let predictions = model.predict(&sentence, 5)?;
/// ```
pub struct MaskedLanguageModel {
    model: ModelManager,
}

impl MaskedLanguageModel {
    pub fn new() -> Self {
        Self {
            model: ModelManager::new(),
        }
    }

    /// Load model from a directory containing config.json, tokenizer.json, and model.safetensors.
    pub fn load_model_from_dir(&self, model_dir: &Path) -> anyhow::Result<()> {
        use std::fs;

        let config_path = model_dir.join("config.json");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_json = fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", config_path.display(), e))?;

        let tokenizer_json = fs::read_to_string(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", tokenizer_path.display(), e))?;

        let model_weights = fs::read(&weights_path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", weights_path.display(), e))?;

        self.model
            .load_model(&config_json, &tokenizer_json, &model_weights)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Predict up to `top_k` ranked candidates for each blank of `sentence`.
    pub fn predict(&self, sentence: &MaskedSentence, top_k: usize) -> anyhow::Result<PredictionSet> {
        self.model.predict(sentence, top_k)
    }
}

impl Default for MaskedLanguageModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a tokenizer from a `tokenizer.json` file.
pub fn load_tokenizer(path: &Path) -> anyhow::Result<Tokenizer> {
    Tokenizer::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))
}

#[cfg(test)]
pub(crate) mod test_support {
    use tokenizers::Tokenizer;

    /// Whitespace word-level tokenizer with a `[MASK]` special token.
    pub fn word_level_tokenizer() -> Tokenizer {
        let json = r#"{
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {
                    "id": 6,
                    "content": "[MASK]",
                    "single_word": false,
                    "lstrip": false,
                    "rstrip": false,
                    "normalized": false,
                    "special": true
                }
            ],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": {
                    "[UNK]": 0, "the": 1, "cat": 2, "sat": 3, "on": 4, "mat": 5,
                    "[MASK]": 6, "because": 7, "it": 8, "was": 9, "tired": 10, ".": 11
                },
                "unk_token": "[UNK]"
            }
        }"#;
        Tokenizer::from_bytes(json.as_bytes()).expect("test tokenizer should parse")
    }
}
