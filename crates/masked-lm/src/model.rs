use anyhow::{Context, Result};
use candle_core::{Device, IndexOp, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{Config, ModernBertForMaskedLM};
use mask_resolver::{Candidate, MaskedSentence, PredictionSet};
use std::sync::{Mutex, MutexGuard};
use tokenizers::{Encoding, Tokenizer};

/// Mask token spelled the way BERT-family tokenizers expect it.
pub const MASK_TOKEN: &str = "[MASK]";

/// Model manager handles loading and inference with the masked language model
pub struct ModelManager {
    state: Mutex<Option<ModelState>>,
}

struct ModelState {
    model: ModernBertForMaskedLM,
    tokenizer: Tokenizer,
    mask_id: u32,
    device: Device,
}

impl ModelManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<ModelState>>> {
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("Model state lock poisoned"))
    }

    /// Initialize the model from in-memory files
    ///
    /// # Arguments
    /// * `config_json` - JSON string containing model config
    /// * `tokenizer_json` - JSON string containing tokenizer config
    /// * `model_weights` - Byte array containing model weights (safetensors format)
    pub fn load_model(
        &self,
        config_json: &str,
        tokenizer_json: &str,
        model_weights: &[u8],
    ) -> Result<()> {
        let mut state_guard = self.lock()?;

        if state_guard.is_some() {
            return Ok(()); // Already loaded
        }

        // CPU only; the demo runs one sentence at a time
        let device = Device::Cpu;

        let tokenizer = Tokenizer::from_bytes(tokenizer_json.as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let mask_id = tokenizer
            .token_to_id(MASK_TOKEN)
            .with_context(|| format!("Tokenizer has no {} token", MASK_TOKEN))?;

        let config: Config =
            serde_json::from_str(config_json).context("Failed to parse config.json")?;

        let vb = VarBuilder::from_buffered_safetensors(
            model_weights.to_vec(),
            candle_core::DType::F32,
            &device,
        )?;

        let model = ModernBertForMaskedLM::load(vb, &config)?;
        tracing::debug!("Loaded masked LM (mask id {})", mask_id);

        *state_guard = Some(ModelState {
            model,
            tokenizer,
            mask_id,
            device,
        });

        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Predict the top `top_k` candidates for every blank of `sentence`.
    ///
    /// All blanks are scored in one forward pass; the returned lists follow
    /// the left-to-right order of the mask tokens in the encoding.
    pub fn predict(&self, sentence: &MaskedSentence, top_k: usize) -> Result<PredictionSet> {
        let state_guard = self.lock()?;
        let state = state_guard
            .as_ref()
            .context("Model not loaded. Call load_model() first with model data.")?;

        let (encoding, positions) = encode_masked(&state.tokenizer, sentence, state.mask_id)?;

        tracing::debug!(
            "Encoded {} tokens, mask positions {:?}",
            encoding.len(),
            positions
        );

        let token_ids = Tensor::new(encoding.get_ids(), &state.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &state.device)?.unsqueeze(0)?;

        let logits = state.model.forward(&token_ids, &attention_mask)?.squeeze(0)?;

        let mut blanks = Vec::with_capacity(positions.len());
        for position in positions {
            let probs = softmax(&logits.i((position, ..))?, D::Minus1)?.to_vec1::<f32>()?;
            blanks.push(decode_candidates(&state.tokenizer, &probs, top_k)?);
        }

        Ok(PredictionSet::new(blanks))
    }
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `sentence` with its markers swapped for [`MASK_TOKEN`] and locate
/// every mask in the resulting token sequence.
pub(crate) fn encode_masked(
    tokenizer: &Tokenizer,
    sentence: &MaskedSentence,
    mask_id: u32,
) -> Result<(Encoding, Vec<usize>)> {
    let text = sentence.with_marker(MASK_TOKEN);
    let encoding = tokenizer
        .encode(text.as_str(), true)
        .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

    let positions: Vec<usize> = encoding
        .get_ids()
        .iter()
        .enumerate()
        .filter(|(_, id)| **id == mask_id)
        .map(|(idx, _)| idx)
        .collect();

    if positions.is_empty() {
        anyhow::bail!("No {} token found after tokenization", MASK_TOKEN);
    }

    Ok((encoding, positions))
}

/// Indices of the `k` highest probabilities, best first.
///
/// The sort is stable, so equal probabilities keep vocabulary order.
pub(crate) fn rank(probs: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = probs.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

/// Turn a probability row into up to `top_k` decoded candidates.
///
/// Tokens that decode to nothing (special or pure-whitespace tokens) are
/// skipped, so a few extra ranks are examined to keep the list full.
fn decode_candidates(tokenizer: &Tokenizer, probs: &[f32], top_k: usize) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::with_capacity(top_k);

    for (id, score) in rank(probs, top_k.saturating_mul(2)) {
        if candidates.len() == top_k {
            break;
        }
        let text = tokenizer
            .decode(&[id as u32], true)
            .map_err(|e| anyhow::anyhow!("Failed to decode token {}: {}", id, e))?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        candidates.push(Candidate::new(text, score));
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::word_level_tokenizer;

    #[test]
    fn test_rank_orders_descending() {
        let ranked = rank(&[0.1, 0.5, 0.2, 0.2], 3);
        assert_eq!(ranked, vec![(1, 0.5), (2, 0.2), (3, 0.2)]);
    }

    #[test]
    fn test_rank_truncates_to_vocab() {
        assert_eq!(rank(&[0.7, 0.3], 5).len(), 2);
        assert!(rank(&[0.7, 0.3], 0).is_empty());
    }

    #[test]
    fn test_encode_masked_finds_every_mask() {
        let tokenizer = word_level_tokenizer();
        let mask_id = tokenizer.token_to_id(MASK_TOKEN).unwrap();
        let sentence = MaskedSentence::parse("the <mask> sat on the <mask>", "<mask>").unwrap();

        let (encoding, positions) = encode_masked(&tokenizer, &sentence, mask_id).unwrap();
        assert_eq!(positions, vec![1, 5]);
        assert_eq!(encoding.get_ids()[1], mask_id);
    }

    #[test]
    fn test_decode_candidates_skips_empty_tokens() {
        let tokenizer = word_level_tokenizer();
        let cat = tokenizer.token_to_id("cat").unwrap();
        let mat = tokenizer.token_to_id("mat").unwrap();
        let mask = tokenizer.token_to_id(MASK_TOKEN).unwrap();

        let mut probs = vec![0.0f32; tokenizer.get_vocab_size(true)];
        probs[mask as usize] = 0.5; // special token, decodes to ""
        probs[cat as usize] = 0.3;
        probs[mat as usize] = 0.2;

        let candidates = decode_candidates(&tokenizer, &probs, 2).unwrap();
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["cat", "mat"]);
        assert!((candidates[0].score - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_predict_requires_loaded_model() {
        let manager = ModelManager::new();
        let sentence = MaskedSentence::parse("the <mask> sat", "<mask>").unwrap();
        assert!(!manager.is_loaded());
        assert!(manager.predict(&sentence, 3).is_err());
    }
}
