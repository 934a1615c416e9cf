//! Fill-mask over the Hugging Face inference API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mask_resolver::{Candidate, MaskedSentence, PredictionSet};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Prediction, PredictionProvider};
use crate::config::{Config, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum HostedError {
    #[error("Authentication error (401): Please ensure your HF_API_TOKEN is correct.")]
    Unauthorized,

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API returned an error: {0}")]
    Api(String),

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Serialize)]
struct FillMaskRequest<'a> {
    inputs: &'a str,
}

/// One entry of the API's ranking; `token` and `sequence` are not needed.
#[derive(Debug, Deserialize)]
struct ApiCandidate {
    score: f32,
    token_str: String,
}

/// A sentence with one mask gets a flat list back, several masks get one
/// list per mask.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FillMaskResponse {
    Single(Vec<ApiCandidate>),
    Multi(Vec<Vec<ApiCandidate>>),
}

/// Normalise a fill-mask response body into per-blank candidate lists.
pub fn parse_fill_mask_response(raw: &serde_json::Value) -> Result<PredictionSet, HostedError> {
    if let Some(message) = raw.get("error") {
        let message = message
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string());
        return Err(HostedError::Api(message));
    }

    let response: FillMaskResponse = serde_json::from_value(raw.clone())
        .map_err(|e| HostedError::UnexpectedShape(e.to_string()))?;

    let to_candidates = |list: Vec<ApiCandidate>| -> Vec<Candidate> {
        list.into_iter()
            .map(|c| Candidate::new(c.token_str, c.score))
            .collect()
    };

    let blanks = match response {
        FillMaskResponse::Single(list) => vec![to_candidates(list)],
        FillMaskResponse::Multi(lists) => lists.into_iter().map(to_candidates).collect(),
    };

    Ok(PredictionSet::new(blanks))
}

pub struct HostedProvider {
    client: reqwest::Client,
    endpoint: String,
    model_id: String,
    mask_token: String,
    token: String,
}

impl HostedProvider {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let token = config.require_api_token()?.to_string();
        let endpoint = format!(
            "{}/{}",
            config.inference_url.trim_end_matches('/'),
            config.hosted_model
        );

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            model_id: config.hosted_model.clone(),
            mask_token: config.hosted_mask_token.clone(),
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The sentence as the hosted model expects it, with its own mask token.
    fn request_input(&self, sentence: &MaskedSentence) -> String {
        sentence.with_marker(&self.mask_token)
    }
}

/// Error for a non-success status; a 401 gets the token hint.
fn status_error(status: StatusCode, body: String) -> HostedError {
    if status == StatusCode::UNAUTHORIZED {
        HostedError::Unauthorized
    } else {
        HostedError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl PredictionProvider for HostedProvider {
    fn name(&self) -> &str {
        &self.model_id
    }

    async fn predict(&self, sentence: &MaskedSentence) -> Result<Prediction> {
        tracing::debug!("POST {} ({} blank(s))", self.endpoint, sentence.blank_count());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&FillMaskRequest {
                inputs: &self.request_input(sentence),
            })
            .send()
            .await
            .context("API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body).into());
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .context("Failed to decode API response as JSON")?;
        let predictions = parse_fill_mask_response(&raw)?;

        tracing::debug!("Received predictions for {} blank(s)", predictions.len());
        Ok(Prediction { predictions, raw })
    }
}
