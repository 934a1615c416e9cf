//! Prediction providers: turn a masked sentence into ranked candidates per blank.
//!
//! - `HostedProvider` - Hugging Face inference API over HTTP
//! - `LocalProvider` - ModernBERT run in-process with candle

mod hosted;
mod local;

pub use hosted::{parse_fill_mask_response, HostedError, HostedProvider};
pub use local::LocalProvider;

use anyhow::Result;
use async_trait::async_trait;
use mask_resolver::{MaskedSentence, PredictionSet};

use crate::config::{Config, ConfigError};

/// Provider output: the normalised predictions plus the body worth persisting.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub predictions: PredictionSet,
    /// Provider response as received (hosted) or the serialised set (local)
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait PredictionProvider: Send + Sync {
    /// Model identifier shown to the user
    fn name(&self) -> &str;

    /// Predict candidates for every blank of `sentence`.
    async fn predict(&self, sentence: &MaskedSentence) -> Result<Prediction>;
}

/// Build the provider selected on the command line.
///
/// The hosted provider needs an API token; without one the error is returned
/// so the caller can report it when fill-mask is actually requested.
pub fn build_provider(
    config: &Config,
    local: bool,
) -> std::result::Result<Box<dyn PredictionProvider>, ConfigError> {
    if local {
        Ok(Box::new(LocalProvider::new(config)))
    } else {
        Ok(Box::new(HostedProvider::new(config)?))
    }
}
