use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Mask token used by RoBERTa-family models on the hosted inference API.
pub const DEFAULT_MARKER: &str = "<mask>";

/// A sentence split around its placeholder markers.
///
/// `segments` always holds `blank_count + 1` entries: the text before the
/// first marker, between each pair of markers, and after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedSentence {
    text: String,
    segments: Vec<String>,
}

impl MaskedSentence {
    /// Split `text` on every occurrence of `marker`.
    ///
    /// Fails if the marker is empty or does not occur in the text.
    pub fn parse(text: &str, marker: &str) -> Result<Self, ValidationError> {
        if marker.is_empty() {
            return Err(ValidationError::EmptyMarker);
        }

        let segments: Vec<String> = text.split(marker).map(str::to_string).collect();
        if segments.len() < 2 {
            return Err(ValidationError::NoMarker {
                marker: marker.to_string(),
            });
        }

        Ok(Self {
            text: text.to_string(),
            segments,
        })
    }

    /// Number of placeholder markers in the sentence.
    pub fn blank_count(&self) -> usize {
        self.segments.len() - 1
    }

    /// The original text, markers included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text around the markers, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Rebuild the sentence with every marker replaced by `mask_token`.
    ///
    /// Providers whose tokenizer spells the mask differently (`[MASK]` vs
    /// `<mask>`) use this before encoding.
    pub fn with_marker(&self, mask_token: &str) -> String {
        self.segments.join(mask_token)
    }
}

impl fmt::Display for MaskedSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A sentence with every blank filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSentence(String);

impl CompletedSentence {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompletedSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
