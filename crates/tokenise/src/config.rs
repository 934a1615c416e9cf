use mask_resolver::DEFAULT_MARKER;
use std::path::{Path, PathBuf};

/// Hosted inference endpoint; the model id is appended as a path segment.
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_HOSTED_MODEL: &str = "distilbert/distilroberta-base";
pub const DEFAULT_LOCAL_MODEL: &str = "answerdotai/ModernBERT-base";
/// Mask token of the default hosted model.
pub const DEFAULT_HOSTED_MASK_TOKEN: &str = "<mask>";
pub const DEFAULT_OUTPUT_PATH: &str = "q1/predictions.json";
pub const DEFAULT_TOP_K: usize = 5;

/// Runtime configuration, built once at startup and handed to the providers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hugging Face API token (required for the hosted provider only)
    pub api_token: Option<String>,
    /// Base URL of the hosted inference API
    pub inference_url: String,
    /// Model queried on the hosted API
    pub hosted_model: String,
    /// How the hosted model spells its mask token
    pub hosted_mask_token: String,
    /// Model repository downloaded for local inference
    pub local_model: String,
    /// Placeholder marker users type in sentences
    pub marker: String,
    /// Candidates requested per blank from the local model
    pub top_k: usize,
    /// Where the raw predictions are written
    pub output_path: PathBuf,
    /// Where downloaded tokenizers and models are kept
    pub cache_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Call [`load_dotenv`] first so values from a `.env` file are visible.
    ///
    /// Recognised variables:
    /// - `HF_API_TOKEN`: Hugging Face API token
    /// - `HF_INFERENCE_URL`: hosted API base URL
    /// - `TOKENISE_HOSTED_MODEL`, `TOKENISE_LOCAL_MODEL`: model ids
    /// - `TOKENISE_HOSTED_MASK`: mask token sent to the hosted model
    /// - `TOKENISE_MARKER`: placeholder marker (default `<mask>`)
    /// - `TOKENISE_TOP_K`: candidates per blank for local inference
    /// - `TOKENISE_OUTPUT`: predictions file (supports ~ for home directory)
    /// - `TOKENISE_CACHE_DIR`: download cache (supports ~ for home directory)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let top_k = match get("TOKENISE_TOP_K") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(k) if k > 0 => k,
                _ => return Err(ConfigError::InvalidTopK { value }),
            },
            None => DEFAULT_TOP_K,
        };

        let cache_dir = match get("TOKENISE_CACHE_DIR") {
            Some(path) => expand_tilde(&path),
            None => dirs::cache_dir()
                .map(|dir| dir.join("tokenise"))
                .ok_or(ConfigError::MissingCacheDir)?,
        };

        Ok(Self {
            api_token: get("HF_API_TOKEN"),
            inference_url: get("HF_INFERENCE_URL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string()),
            hosted_model: get("TOKENISE_HOSTED_MODEL")
                .unwrap_or_else(|| DEFAULT_HOSTED_MODEL.to_string()),
            hosted_mask_token: get("TOKENISE_HOSTED_MASK")
                .unwrap_or_else(|| DEFAULT_HOSTED_MASK_TOKEN.to_string()),
            local_model: get("TOKENISE_LOCAL_MODEL")
                .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string()),
            marker: get("TOKENISE_MARKER").unwrap_or_else(|| DEFAULT_MARKER.to_string()),
            top_k,
            output_path: get("TOKENISE_OUTPUT")
                .map(|path| expand_tilde(&path))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            cache_dir,
        })
    }

    /// The API token, or the error to show when the hosted provider is unusable.
    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .ok_or(ConfigError::MissingApiToken)
    }

    /// Directory a Hugging Face repository is downloaded into.
    pub fn repo_dir(&self, repo: &str) -> PathBuf {
        repo_dir(&self.cache_dir, repo)
    }
}

/// `gpt2` -> `<cache>/gpt2`, `answerdotai/ModernBERT-base` -> `<cache>/answerdotai--ModernBERT-base`
pub fn repo_dir(cache_dir: &Path, repo: &str) -> PathBuf {
    cache_dir.join(repo.replace('/', "--"))
}

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment. Variables that are already set win.
pub fn load_dotenv() -> Option<PathBuf> {
    log_dotenv(dotenvy::dotenv())
}

/// Load a specific dotenv file into the process environment.
pub fn load_dotenv_from(path: &Path) -> Option<PathBuf> {
    log_dotenv(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn log_dotenv(result: dotenvy::Result<PathBuf>) -> Option<PathBuf> {
    match result {
        Ok(path) => {
            tracing::debug!("Loaded {}", path.display());
            Some(path)
        }
        Err(err) if err.not_found() => None,
        Err(err) => {
            tracing::warn!("Ignoring unreadable .env: {}", err);
            None
        }
    }
}

/// Expand ~ or ~/ prefix to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "HF_API_TOKEN not found. Please create a .env file with your Hugging Face API token to use this feature."
    )]
    MissingApiToken,

    #[error("TOKENISE_TOP_K must be a positive integer, got '{value}'")]
    InvalidTopK { value: String },

    #[error("Could not determine a cache directory; set TOKENISE_CACHE_DIR")]
    MissingCacheDir,
}
